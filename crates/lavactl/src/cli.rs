//! Command-line argument definitions.

use clap::{ArgAction, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "lavactl",
    version,
    about = "Manage Rackspace Cloud Big Data (Lava) clusters",
    long_about = "Manage Rackspace Cloud Big Data (Lava) clusters, stacks, flavors, \
                  workloads, and scripts from the command line."
)]
pub struct Cli {
    /// Base API endpoint
    #[arg(long, global = true, env = "LAVA_API_URL")]
    pub api_url: Option<String>,

    /// Tenant id
    #[arg(long, global = true, env = "LAVA_TENANT_ID")]
    pub tenant: Option<String>,

    /// Auth token
    #[arg(long, global = true, env = "LAVA_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short = 'o', long, global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage clusters
    #[command(subcommand)]
    Cluster(ClusterCommand),

    /// Inspect available stacks
    #[command(subcommand)]
    Stack(StackCommand),

    /// Inspect available flavors
    #[command(subcommand)]
    Flavor(FlavorCommand),

    /// Inspect workloads and sizing recommendations
    #[command(subcommand)]
    Workload(WorkloadCommand),

    /// Manage post-install scripts
    #[command(subcommand)]
    Script(ScriptCommand),

    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub enum ClusterCommand {
    /// List all clusters
    List,

    /// Show one cluster with its node groups and scripts
    Get {
        /// Cluster id
        cluster_id: String,
    },

    /// Provision a new cluster
    Create {
        /// Cluster name
        name: String,

        /// Login user created on the cluster nodes
        #[arg(long)]
        username: String,

        /// Keypair installed for the login user
        #[arg(long)]
        keypair: String,

        /// Stack to build the cluster from
        #[arg(long)]
        stack: String,

        /// Node group override, e.g. 'slave(count=10, flavor_id=hadoop1-7)'.
        /// Repeatable.
        #[arg(long = "node-group", value_name = "SPEC")]
        node_groups: Vec<String>,

        /// Block until the cluster reaches ACTIVE or ERROR
        #[arg(long)]
        wait: bool,

        /// Seconds between status polls while waiting
        #[arg(long, default_value_t = 30)]
        wait_interval: u64,

        /// Give up waiting after this many seconds
        #[arg(long)]
        wait_timeout: Option<u64>,
    },

    /// Delete a cluster
    Delete {
        /// Cluster id
        cluster_id: String,
    },

    /// Poll a cluster until it reaches ACTIVE or ERROR
    Wait {
        /// Cluster id
        cluster_id: String,

        /// Seconds between status polls
        #[arg(long, default_value_t = 30)]
        interval: u64,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum StackCommand {
    /// List all stacks
    List,

    /// Show one stack with its node group templates
    Get {
        /// Stack id
        stack_id: String,
    },

    /// Register a custom stack
    Create {
        /// Stack name
        name: String,

        /// Distribution the stack is built on
        #[arg(long)]
        distro: String,

        /// Human-readable description
        #[arg(long)]
        description: Option<String>,

        /// Service spec, e.g. 'HDFS' or 'HDFS=Secondary,NameNode'. Repeatable.
        #[arg(long = "service", value_name = "SPEC")]
        services: Vec<String>,
    },

    /// Delete a custom stack
    Delete {
        /// Stack id
        stack_id: String,
    },
}

#[derive(Subcommand)]
pub enum FlavorCommand {
    /// List all node flavors
    List,
}

#[derive(Subcommand)]
pub enum WorkloadCommand {
    /// List workload types
    List,

    /// Show sizing recommendations for a workload
    Recommendations {
        /// Workload id
        workload_id: String,

        /// Expected data size in GB
        #[arg(long = "storage-size")]
        storage_size: f64,

        /// Persistence mode: all, none, or data
        #[arg(long)]
        persistent: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ScriptCommand {
    /// List registered scripts
    List,

    /// Register a new script
    Create {
        /// Script name
        name: String,

        /// URL the script is fetched from
        #[arg(long)]
        url: String,

        /// Script type
        #[arg(long = "type", default_value = "POST_INIT")]
        script_type: String,
    },

    /// Update an existing script
    Update {
        /// Script id
        script_id: String,

        /// Script name
        #[arg(long)]
        name: String,

        /// URL the script is fetched from
        #[arg(long)]
        url: String,

        /// Script type
        #[arg(long = "type", default_value = "POST_INIT")]
        script_type: String,
    },

    /// Delete a script
    Delete {
        /// Script id
        script_id: String,
    },
}
