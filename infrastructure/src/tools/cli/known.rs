//! Curated table of well-known CLI commands.
//!
//! Only commands listed here are auto-detected (unless explicitly
//! allowlisted). Each entry carries a description for the model and a
//! safety classification:
//!
//! | Class        | Outside a container | Inside a container |
//! |--------------|---------------------|--------------------|
//! | safe         | offered             | offered            |
//! | docker-only  | skipped             | offered            |
//! | blocked      | skipped             | skipped            |

/// A known command and how far it can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownCommand {
    pub name: &'static str,
    pub description: &'static str,
    /// Read-only or otherwise harmless
    pub safe: bool,
    /// Modifies files; only offered inside a container
    pub docker_only: bool,
    /// Never auto-detected
    pub blocked: bool,
}

const fn safe(name: &'static str, description: &'static str) -> KnownCommand {
    KnownCommand {
        name,
        description,
        safe: true,
        docker_only: false,
        blocked: false,
    }
}

const fn docker_only(name: &'static str, description: &'static str) -> KnownCommand {
    KnownCommand {
        name,
        description,
        safe: false,
        docker_only: true,
        blocked: false,
    }
}

const fn blocked(name: &'static str, description: &'static str) -> KnownCommand {
    KnownCommand {
        name,
        description,
        safe: false,
        docker_only: false,
        blocked: true,
    }
}

/// Commands that are never auto-detected, whatever the table says.
pub const DEFAULT_BLOCKLIST: &[&str] = &[
    "rm", "sudo", "su", "chmod", "chown", "dd", "mkfs", "fdisk", "kill", "killall", "pkill",
    "reboot", "shutdown", "poweroff", "halt", "passwd", "useradd", "userdel", "groupadd",
    "groupdel", "iptables", "ip6tables", "nft", "firewall-cmd", "systemctl", "service", "init",
];

pub const KNOWN_COMMANDS: &[KnownCommand] = &[
    // Files
    safe("ls", "List directory contents"),
    safe("cat", "Display file contents"),
    safe("head", "Show first lines of a file"),
    safe("tail", "Show last lines of a file"),
    safe("wc", "Count lines, words, and characters in files"),
    safe("file", "Determine file type"),
    safe("stat", "Display file status and metadata"),
    safe("du", "Estimate file and directory disk usage"),
    safe("df", "Show disk space usage"),
    safe("tree", "Display directory tree structure"),
    safe("find", "Find files by name, type, or attributes"),
    safe("locate", "Find files by name using database"),
    safe("which", "Show full path of commands"),
    safe("whereis", "Locate binary, source, and manual files"),
    safe("realpath", "Resolve absolute path"),
    safe("basename", "Strip directory from filename"),
    safe("dirname", "Strip filename from path"),
    // Text processing
    safe("grep", "Search text patterns in files"),
    safe("egrep", "Search extended regex patterns in files"),
    safe("fgrep", "Search fixed string patterns in files"),
    safe("awk", "Pattern scanning and text processing"),
    safe("sed", "Stream editor for text transformation"),
    safe("cut", "Remove sections from lines"),
    safe("sort", "Sort lines of text"),
    safe("uniq", "Filter or report repeated lines"),
    safe("tr", "Translate or delete characters"),
    safe("tee", "Read from stdin and write to stdout and files"),
    safe("xargs", "Build and execute commands from stdin"),
    safe("diff", "Compare files line by line"),
    safe("comm", "Compare two sorted files line by line"),
    safe("paste", "Merge lines of files"),
    safe("join", "Join lines of two files on a common field"),
    safe("nl", "Number lines of files"),
    safe("fmt", "Simple text formatter"),
    safe("fold", "Wrap lines to specified width"),
    safe("expand", "Convert tabs to spaces"),
    safe("unexpand", "Convert spaces to tabs"),
    safe("column", "Format input into columns"),
    safe("rev", "Reverse lines character-wise"),
    safe("tac", "Display file in reverse line order"),
    // Data formats
    safe("jq", "JSON processor and query tool"),
    safe("yq", "YAML/JSON/XML processor"),
    safe("xmllint", "XML parser and validator"),
    safe("csvtool", "CSV file manipulation"),
    // Compression
    safe("gzip", "Compress or decompress files"),
    safe("gunzip", "Decompress gzip files"),
    safe("zcat", "View compressed file contents"),
    safe("bzip2", "Compress or decompress files"),
    safe("bunzip2", "Decompress bzip2 files"),
    safe("bzcat", "View bzip2 compressed file contents"),
    safe("xz", "Compress or decompress files"),
    safe("unxz", "Decompress xz files"),
    safe("xzcat", "View xz compressed file contents"),
    safe("tar", "Archive files (tar)"),
    safe("zip", "Package and compress files"),
    safe("unzip", "Extract zip archives"),
    // System info
    safe("date", "Display current date and time"),
    safe("cal", "Display calendar"),
    safe("uptime", "Show system uptime"),
    safe("hostname", "Show or set system hostname"),
    safe("uname", "Print system information"),
    safe("whoami", "Print current username"),
    safe("id", "Print user and group IDs"),
    safe("groups", "Print group memberships"),
    safe("env", "Print environment variables"),
    safe("printenv", "Print environment variables"),
    safe("pwd", "Print working directory"),
    safe("free", "Display memory usage"),
    safe("vmstat", "Report virtual memory statistics"),
    safe("iostat", "Report I/O statistics"),
    safe("lscpu", "Display CPU architecture information"),
    safe("lsblk", "List block devices"),
    safe("lsusb", "List USB devices"),
    safe("lspci", "List PCI devices"),
    // Processes
    safe("ps", "Report process status"),
    safe("top", "Display running processes (use -b for batch mode)"),
    safe("htop", "Interactive process viewer"),
    safe("pgrep", "Find processes by name"),
    safe("pidof", "Find process ID by name"),
    safe("pstree", "Display process tree"),
    safe("lsof", "List open files"),
    // Network diagnostics
    safe("ping", "Send ICMP echo requests to hosts"),
    safe("curl", "Transfer data from URLs"),
    safe("wget", "Download files from web"),
    safe("dig", "DNS lookup utility"),
    safe("nslookup", "Query DNS servers"),
    safe("host", "DNS lookup utility"),
    safe("traceroute", "Trace packet route to host"),
    safe("netstat", "Network statistics"),
    safe("ss", "Socket statistics"),
    safe("ip", "Show/manipulate routing and network devices"),
    safe("ifconfig", "Configure network interfaces"),
    safe("arp", "Display ARP table"),
    // Development
    safe("git", "Version control system"),
    safe("python", "Python interpreter"),
    safe("python3", "Python 3 interpreter"),
    safe("pip", "Python package installer"),
    safe("pip3", "Python 3 package installer"),
    safe("node", "Node.js JavaScript runtime"),
    safe("npm", "Node.js package manager"),
    safe("npx", "Execute npm packages"),
    safe("yarn", "JavaScript package manager"),
    safe("ruby", "Ruby interpreter"),
    safe("gem", "Ruby package manager"),
    safe("go", "Go programming language"),
    safe("rustc", "Rust compiler"),
    safe("cargo", "Rust package manager"),
    safe("make", "Build automation tool"),
    safe("cmake", "Cross-platform build system"),
    safe("gcc", "GNU C compiler"),
    safe("g++", "GNU C++ compiler"),
    safe("clang", "LLVM C compiler"),
    safe("javac", "Java compiler"),
    safe("java", "Java runtime"),
    // Containers
    safe("docker", "Container management"),
    safe("docker-compose", "Multi-container Docker applications"),
    safe("kubectl", "Kubernetes command-line tool"),
    // File modification
    docker_only("cp", "Copy files and directories"),
    docker_only("mv", "Move or rename files"),
    docker_only("mkdir", "Create directories"),
    docker_only("touch", "Create empty file or update timestamp"),
    docker_only("ln", "Create links between files"),
    docker_only("rmdir", "Remove empty directories"),
    // Dangerous
    blocked("rm", "Remove files (DANGEROUS)"),
    blocked("sudo", "Execute as superuser (DANGEROUS)"),
    blocked("su", "Switch user (DANGEROUS)"),
    blocked("chmod", "Change file permissions"),
    blocked("chown", "Change file ownership"),
    blocked("dd", "Low-level data copy (DANGEROUS)"),
    blocked("mkfs", "Create filesystem (DANGEROUS)"),
    blocked("fdisk", "Partition table manipulator (DANGEROUS)"),
    blocked("kill", "Send signal to process"),
    blocked("killall", "Kill processes by name"),
    blocked("pkill", "Kill processes by pattern"),
    blocked("reboot", "Reboot system (DANGEROUS)"),
    blocked("shutdown", "Shutdown system (DANGEROUS)"),
    blocked("poweroff", "Power off system (DANGEROUS)"),
    blocked("halt", "Halt system (DANGEROUS)"),
];

/// Look up a command in the curated table.
pub fn lookup(name: &str) -> Option<&'static KnownCommand> {
    KNOWN_COMMANDS.iter().find(|c| c.name == name)
}
