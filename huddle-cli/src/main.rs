//! huddle — terminal console for the Huddle multi-agent workspace.
//!
//! Talks to the same HTTP API as the web console and keeps a signed-in
//! session on disk, so `huddle login` once and then:
//!
//! - `huddle send "text" --to ana,bruno` for one-shot messages
//! - `huddle chat` for an interactive loop
//! - `huddle threads` / `huddle upload` for conversation housekeeping
//! - `huddle admin ...` for tenant administration

mod commands;
mod output;

use clap::{Parser, Subcommand};

use commands::admin::AgentOpts;
use commands::Ctx;
use huddle_core::{ApiClient, ClientConfig, SessionStore};

// ============================================================================
// Command-line surface
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "huddle", version, about = "Terminal console for the Huddle workspace")]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, env = "HUDDLE_API_BASE_URL", global = true)]
    server: Option<String>,

    /// Path to a config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Print raw JSON instead of rendered output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Tenant slug (defaults to the stored session's tenant)
        #[arg(long)]
        tenant: Option<String>,

        #[arg(long, short = 'e')]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account on a tenant
    Register {
        #[arg(long)]
        tenant: Option<String>,

        #[arg(long)]
        name: String,

        #[arg(long, short = 'e')]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Show server health and session state
    Status,

    /// Manage conversations
    Threads {
        #[command(subcommand)]
        action: ThreadAction,
    },

    /// Print a conversation's messages
    Messages {
        thread_id: String,
    },

    /// Send one message and print the reply
    Send {
        text: String,

        /// Conversation to post into (a new one is created when omitted)
        #[arg(long)]
        thread: Option<String>,

        /// Agent names or ids to address (default: the whole team)
        #[arg(long, value_delimiter = ',')]
        to: Vec<String>,
    },

    /// Interactive chat loop
    Chat {
        /// Conversation to resume
        #[arg(long)]
        thread: Option<String>,
    },

    /// List the tenant's agents
    Agents,

    /// Upload a file into a conversation, to agents, or tenant-wide
    Upload {
        path: String,

        /// Attach to this conversation
        #[arg(long)]
        thread: Option<String>,

        /// Link to these agents (names or ids)
        #[arg(long, value_delimiter = ',')]
        agents: Vec<String>,

        /// Share tenant-wide (admins publish directly, members file a request)
        #[arg(long)]
        institutional: bool,
    },

    /// Tenant administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Debug, Subcommand)]
enum ThreadAction {
    /// List conversations, newest first
    List,

    /// Start a conversation
    New {
        #[arg(default_value = "New conversation")]
        title: String,
    },

    /// Rename a conversation
    Rename { thread_id: String, title: String },

    /// Delete a conversation
    Delete { thread_id: String },
}

#[derive(Debug, Subcommand)]
enum AdminAction {
    /// Tenant-wide counters
    Overview,

    /// List user accounts
    Users {
        /// Only accounts awaiting approval
        #[arg(long)]
        pending: bool,
    },

    /// Approve a pending account
    Approve { user_id: String },

    /// Reject a pending account
    Reject { user_id: String },

    /// List stored files
    Files {
        /// Only institutional documents
        #[arg(long)]
        institutional_only: bool,
    },

    /// Pending institutional-promotion requests
    FileRequests,

    /// Recent request audit log
    Audit,

    /// Token usage per agent
    Costs {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Upload an institutional document
    Upload { path: String },

    /// Manage the agent roster
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Hand an instruction from one agent to another
    Delegate {
        /// Source agent (name or id)
        #[arg(long)]
        from: String,

        /// Target agent (name or id)
        #[arg(long)]
        to: String,

        #[arg(long, short = 'm')]
        instruction: String,

        /// Title for the delegation conversation
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum AgentAction {
    /// List agents with their model settings
    List,

    /// Create an agent
    Create {
        name: String,

        #[command(flatten)]
        opts: AgentOpts,
    },

    /// Update an agent (omitted flags keep the current values)
    Update {
        /// Agent name or id
        reference: String,

        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        opts: AgentOpts,
    },

    /// Delete an agent
    Delete { reference: String },

    /// Show an agent's consultation links
    Links { reference: String },

    /// Replace an agent's consultation links
    LinkSet {
        reference: String,

        /// Target agents (names or ids)
        #[arg(long, value_delimiter = ',')]
        to: Vec<String>,

        #[arg(long, default_value = "consult")]
        mode: String,
    },

    /// Show an agent's knowledge attachments
    Knowledge { reference: String },

    /// Attach an institutional file to an agent
    KnowledgeLink { reference: String, file_id: String },

    /// Detach a knowledge link
    KnowledgeUnlink { reference: String, link_id: String },
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("huddle: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.api_base_url = Some(server);
    }

    let store = SessionStore::open_default()?;
    let session = store.load()?;
    let ctx = Ctx {
        client: ApiClient::new(&config)?,
        store,
        session,
        json: cli.json,
    };

    match cli.command {
        Commands::Login { tenant, email, password } => {
            commands::auth::login(&ctx, tenant, &email, password).await
        }
        Commands::Register { tenant, name, email, password } => {
            commands::auth::register(&ctx, tenant, &name, &email, password).await
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Status => commands::auth::status(&ctx).await,

        Commands::Threads { action } => match action {
            ThreadAction::List => commands::threads::list(&ctx).await,
            ThreadAction::New { title } => commands::threads::create(&ctx, &title).await,
            ThreadAction::Rename { thread_id, title } => {
                commands::threads::rename(&ctx, &thread_id, &title).await
            }
            ThreadAction::Delete { thread_id } => {
                commands::threads::delete(&ctx, &thread_id).await
            }
        },
        Commands::Messages { thread_id } => commands::threads::messages(&ctx, &thread_id).await,

        Commands::Send { text, thread, to } => commands::chat::send(&ctx, &text, thread, to).await,
        Commands::Chat { thread } => commands::chat::repl(&ctx, thread).await,
        Commands::Agents => commands::chat::agents(&ctx).await,

        Commands::Upload { path, thread, agents, institutional } => {
            commands::upload::upload(&ctx, &path, thread, agents, institutional).await
        }

        Commands::Admin { action } => match action {
            AdminAction::Overview => commands::admin::overview(&ctx).await,
            AdminAction::Users { pending } => commands::admin::users(&ctx, pending).await,
            AdminAction::Approve { user_id } => commands::admin::approve(&ctx, &user_id).await,
            AdminAction::Reject { user_id } => commands::admin::reject(&ctx, &user_id).await,
            AdminAction::Files { institutional_only } => {
                commands::admin::files(&ctx, institutional_only).await
            }
            AdminAction::FileRequests => commands::admin::file_requests(&ctx).await,
            AdminAction::Audit => commands::admin::audit(&ctx).await,
            AdminAction::Costs { days } => commands::admin::costs(&ctx, days).await,
            AdminAction::Upload { path } => commands::admin::upload(&ctx, &path).await,
            AdminAction::Agent { action } => match action {
                AgentAction::List => commands::admin::agents(&ctx).await,
                AgentAction::Create { name, opts } => {
                    commands::admin::agent_create(&ctx, &name, opts).await
                }
                AgentAction::Update { reference, name, opts } => {
                    commands::admin::agent_update(&ctx, &reference, name, opts).await
                }
                AgentAction::Delete { reference } => {
                    commands::admin::agent_delete(&ctx, &reference).await
                }
                AgentAction::Links { reference } => {
                    commands::admin::links(&ctx, &reference).await
                }
                AgentAction::LinkSet { reference, to, mode } => {
                    commands::admin::link_set(&ctx, &reference, to, &mode).await
                }
                AgentAction::Knowledge { reference } => {
                    commands::admin::knowledge(&ctx, &reference).await
                }
                AgentAction::KnowledgeLink { reference, file_id } => {
                    commands::admin::knowledge_link(&ctx, &reference, &file_id).await
                }
                AgentAction::KnowledgeUnlink { reference, link_id } => {
                    commands::admin::knowledge_unlink(&ctx, &reference, &link_id).await
                }
            },
            AdminAction::Delegate { from, to, instruction, title } => {
                commands::admin::delegate(&ctx, &from, &to, &instruction, title).await
            }
        },
    }
}
