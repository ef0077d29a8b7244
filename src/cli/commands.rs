//! CLI commands

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::AgentClient;
use crate::config::Config;
use crate::db::{AgentRepository, Database, ResumeRepository};
use crate::render;
use crate::stream::{StreamConsumer, StreamSession};

#[derive(Parser)]
#[command(name = "agentwatch")]
#[command(about = "Terminal client for launching and watching agent runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.agentwatch/config.yml)
    #[arg(long)]
    config: Option<String>,

    /// Agent server base URL (overrides config)
    #[arg(long)]
    server: Option<String>,

    /// Database path (overrides config)
    #[arg(long)]
    database: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a run and stream its events until it finishes
    Run {
        /// Input text handed to the agent
        input: String,
    },

    /// Attach to the event stream of an already-launched run
    Attach {
        /// Run ID
        run_id: String,
    },

    /// Check agent server and database health
    Status,

    /// List agents
    Agents,

    /// Create a new agent
    CreateAgent {
        /// Agent name
        name: String,

        /// Agent description
        #[arg(long)]
        description: Option<String>,

        /// Custom instructions for the agent
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Delete an agent
    DeleteAgent {
        /// Agent ID
        agent_id: String,
    },

    /// Set (or clear) the current resume for an agent
    SetResume {
        /// Agent ID
        agent_id: String,

        /// Resume ID (omit to clear)
        resume_id: Option<String>,
    },

    /// List resumes
    Resumes,

    /// Register a resume file
    AddResume {
        /// Original file name
        filename: String,

        /// Stored file path
        filepath: String,
    },

    /// Delete a resume
    DeleteResume {
        /// Resume ID
        resume_id: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let server_url = cli.server.unwrap_or_else(|| config.server_url.clone());
    let db_path = match cli.database {
        Some(path) => std::path::PathBuf::from(path),
        None => config.resolve_db_path()?,
    };

    // Create a multi-threaded runtime for CLI operations
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match cli.command {
            Commands::Run { input } => {
                let client = AgentClient::new(server_url.clone());
                let run_id = client.launch_run(&input).await?;

                println!("Run started: {}", run_id);
                stream_run(&server_url, &run_id).await
            }

            Commands::Attach { run_id } => stream_run(&server_url, &run_id).await,

            Commands::Status => {
                let client = AgentClient::new(server_url);
                let server_ok = client.health_check().await?;

                let db = Database::new(&db_path)?;
                let db_ok = db.health_check().await?;

                println!(
                    "server: {} ({})",
                    if server_ok { "ok" } else { "unreachable" },
                    client.base_url()
                );
                println!(
                    "database: {} ({})",
                    if db_ok { "ok" } else { "unavailable" },
                    db.path()
                );
                Ok(())
            }

            Commands::Agents => {
                let db = Database::new(&db_path)?;
                let repo = AgentRepository::new(db);

                let agents = repo.list(Some(&config.user_id)).await?;

                if agents.is_empty() {
                    println!("No agents found");
                } else {
                    for agent in agents {
                        println!(
                            "[{}] {} - {} (resume: {})",
                            agent.agent_id.chars().take(8).collect::<String>(),
                            agent.name,
                            agent.description.as_deref().unwrap_or("-"),
                            agent
                                .current_resume_id
                                .as_deref()
                                .map(|id| id.chars().take(8).collect::<String>())
                                .unwrap_or_else(|| "-".to_string()),
                        );
                    }
                }
                Ok(())
            }

            Commands::CreateAgent {
                name,
                description,
                instructions,
            } => {
                let db = Database::new(&db_path)?;
                let repo = AgentRepository::new(db);

                let agent = repo
                    .create(&config.user_id, &name, description, instructions)
                    .await?;

                println!("Created agent: {} ({})", agent.name, agent.agent_id);
                Ok(())
            }

            Commands::DeleteAgent { agent_id } => {
                let db = Database::new(&db_path)?;
                let repo = AgentRepository::new(db);

                repo.delete(&agent_id).await?;

                println!("Deleted agent: {}", agent_id);
                Ok(())
            }

            Commands::SetResume { agent_id, resume_id } => {
                let db = Database::new(&db_path)?;
                let repo = AgentRepository::new(db);

                repo.set_current_resume(&agent_id, resume_id.as_deref())
                    .await?;

                match resume_id {
                    Some(id) => println!("Agent {} now uses resume {}", agent_id, id),
                    None => println!("Cleared current resume for agent {}", agent_id),
                }
                Ok(())
            }

            Commands::Resumes => {
                let db = Database::new(&db_path)?;
                let repo = ResumeRepository::new(db);

                let resumes = repo.list(Some(&config.user_id)).await?;

                if resumes.is_empty() {
                    println!("No resumes found");
                } else {
                    for resume in resumes {
                        println!(
                            "[{}] {} - {}",
                            resume.resume_id.chars().take(8).collect::<String>(),
                            resume.filename,
                            resume.filepath,
                        );
                    }
                }
                Ok(())
            }

            Commands::AddResume { filename, filepath } => {
                let db = Database::new(&db_path)?;
                let repo = ResumeRepository::new(db);

                let resume = repo.create(&config.user_id, &filename, &filepath).await?;

                println!("Added resume: {} ({})", resume.filename, resume.resume_id);
                Ok(())
            }

            Commands::DeleteResume { resume_id } => {
                let db = Database::new(&db_path)?;
                let repo = ResumeRepository::new(db);

                repo.delete(&resume_id).await?;

                println!("Deleted resume: {}", resume_id);
                Ok(())
            }
        }
    })
}

/// Attach to a run's stream and print events as they arrive
async fn stream_run(server_url: &str, run_id: &str) -> Result<()> {
    let consumer = StreamConsumer::new(server_url)?;
    let mut session = StreamSession::new();

    let result = consumer
        .attach(&mut session, run_id, |event| {
            println!("{}", render::format_line(event));
        })
        .await;

    println!("{}", render::render_status(&session));

    result?;
    Ok(())
}
