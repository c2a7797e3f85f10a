use std::path::PathBuf;
use std::process::ExitCode;

use chatwoot_client::{
    Attachment, ChatwootClient, ClientConfig, ConversationStatus, CreateContactRequest,
    CreateConversationRequest, Error, Result,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "chatwoot", version, about = "Talk to a Chatwoot instance from the shell")]
struct Cli {
    #[command(flatten)]
    conn: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the values stored in chatwoot.toml.
#[derive(Args, Debug)]
struct ConnectionArgs {
    #[arg(long, global = true, env = "CHATWOOT_BASE_URL")]
    base_url: Option<String>,
    #[arg(long, global = true, env = "CHATWOOT_ACCOUNT_ID")]
    account_id: Option<i64>,
    #[arg(long, global = true, env = "CHATWOOT_AGENT_TOKEN", hide_env_values = true)]
    agent_token: Option<String>,
    #[arg(long, global = true, env = "CHATWOOT_AGENT_BOT_TOKEN", hide_env_values = true)]
    agent_bot_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Contact(ContactCommand),
    #[command(subcommand)]
    Conversation(ConversationCommand),
    #[command(subcommand)]
    Message(MessageCommand),
    #[command(subcommand)]
    Label(LabelCommand),
    #[command(subcommand)]
    Assign(AssignCommand),
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ContactCommand {
    Create {
        #[arg(long)]
        inbox_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone_number: Option<String>,
        #[arg(long)]
        identifier: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConversationCommand {
    Create {
        #[arg(long)]
        source_id: String,
        #[arg(long)]
        inbox_id: i64,
        #[arg(long)]
        contact_id: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StatusArg {
    Open,
    Resolved,
    Pending,
    Snoozed,
}

impl From<StatusArg> for ConversationStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Open => ConversationStatus::Open,
            StatusArg::Resolved => ConversationStatus::Resolved,
            StatusArg::Pending => ConversationStatus::Pending,
            StatusArg::Snoozed => ConversationStatus::Snoozed,
        }
    }
}

#[derive(Subcommand, Debug)]
enum MessageCommand {
    List {
        conversation_id: i64,
    },
    Send {
        conversation_id: i64,
        content: String,
        #[arg(long)]
        incoming: bool,
        #[arg(long)]
        private: bool,
    },
    /// Download an image and post it as an attachment
    Image {
        conversation_id: i64,
        url: String,
    },
    /// Upload a local file as an attachment
    File {
        conversation_id: i64,
        path: PathBuf,
        #[arg(long)]
        caption: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum LabelCommand {
    Add {
        conversation_id: i64,
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AssignCommand {
    Agent { conversation_id: i64, assignee_id: i64 },
    Team { conversation_id: i64, team_id: i64 },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Persist the effective connection settings
    Save,
}

impl From<ConnectionArgs> for ClientConfig {
    fn from(conn: ConnectionArgs) -> Self {
        ClientConfig {
            base_url: conn.base_url.unwrap_or_default(),
            account_id: conn.account_id,
            agent_token: conn.agent_token,
            agent_bot_token: conn.agent_bot_token,
        }
    }
}

/// Stored config with flags and `CHATWOOT_*` variables layered on top.
fn effective_config(stored: ClientConfig, conn: ConnectionArgs) -> ClientConfig {
    stored.merge(conn.into())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn connect(config: &ClientConfig) -> CliResult<(ChatwootClient, i64)> {
    if config.base_url.is_empty() {
        return Err("no base URL; pass --base-url or set CHATWOOT_BASE_URL".into());
    }
    let account_id = config
        .account_id
        .ok_or("no account id; pass --account-id or set CHATWOOT_ACCOUNT_ID")?;
    Ok((config.client(), account_id))
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = effective_config(ClientConfig::load(), cli.conn);
    let bot_token = config.bot_token();
    let agent_token = config.agent_token();

    match cli.command {
        Command::Config(ConfigCommand::Save) => {
            let path = config.save()?;
            println!("saved {}", path.display());
        }
        Command::Contact(ContactCommand::Create { inbox_id, name, email, phone_number, identifier }) => {
            let (client, account_id) = connect(&config)?;
            let request = CreateContactRequest {
                name,
                email,
                phone_number,
                identifier,
                ..CreateContactRequest::new(inbox_id)
            };
            print_json(&client.create_contact(account_id, agent_token, &request).await?)?;
        }
        Command::Conversation(ConversationCommand::Create { source_id, inbox_id, contact_id, status }) => {
            let (client, account_id) = connect(&config)?;
            let request = CreateConversationRequest {
                source_id,
                inbox_id,
                contact_id,
                status: status.map(Into::into),
            };
            print_json(&client.create_conversation(account_id, bot_token, &request).await?)?;
        }
        Command::Message(MessageCommand::List { conversation_id }) => {
            let (client, account_id) = connect(&config)?;
            print_json(&client.get_messages(account_id, conversation_id, bot_token).await?)?;
        }
        Command::Message(MessageCommand::Send { conversation_id, content, incoming, private }) => {
            let (client, account_id) = connect(&config)?;
            let resp = match (incoming, private) {
                (false, false) => {
                    client.create_outgoing_message(account_id, conversation_id, bot_token, &content).await?
                }
                (false, true) => {
                    client.create_outgoing_private_message(account_id, conversation_id, bot_token, &content).await?
                }
                (true, false) => {
                    client.create_incoming_message(account_id, conversation_id, bot_token, &content).await?
                }
                (true, true) => {
                    client.create_incoming_private_message(account_id, conversation_id, bot_token, &content).await?
                }
            };
            print_json(&resp)?;
        }
        Command::Message(MessageCommand::Image { conversation_id, url }) => {
            let (client, account_id) = connect(&config)?;
            print_json(&client.send_image_message(account_id, conversation_id, bot_token, &url).await?)?;
        }
        Command::Message(MessageCommand::File { conversation_id, path, caption }) => {
            let (client, account_id) = connect(&config)?;
            let attachment = Attachment::from_path(&path)?;
            let resp = client
                .send_attachment_message(account_id, conversation_id, bot_token, &attachment, caption.as_deref())
                .await?;
            print_json(&resp)?;
        }
        Command::Label(LabelCommand::Add { conversation_id, labels }) => {
            let (client, account_id) = connect(&config)?;
            match labels.as_slice() {
                [label] => client.add_label(account_id, conversation_id, agent_token, label).await?,
                _ => client.add_labels(account_id, conversation_id, agent_token, &labels).await?,
            }
            println!("labels added");
        }
        Command::Assign(AssignCommand::Agent { conversation_id, assignee_id }) => {
            let (client, account_id) = connect(&config)?;
            client.assign(account_id, conversation_id, agent_token, assignee_id).await?;
            println!("assigned to agent {}", assignee_id);
        }
        Command::Assign(AssignCommand::Team { conversation_id, team_id }) => {
            let (client, account_id) = connect(&config)?;
            client.assign_team(account_id, conversation_id, agent_token, team_id).await?;
            println!("assigned to team {}", team_id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(Error::Status { body, .. }) = e.downcast_ref::<Error>() {
                log::debug!("response body: {}", body);
            }
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> ClientConfig {
        ClientConfig {
            base_url: "https://stored.example.com".into(),
            account_id: Some(1),
            agent_token: Some("stored-agent".into()),
            agent_bot_token: None,
        }
    }

    #[test]
    fn flags_override_stored_config() {
        let cli = Cli::try_parse_from([
            "chatwoot",
            "--base-url",
            "https://flag.example.com",
            "--account-id",
            "7",
            "message",
            "list",
            "3",
        ])
        .unwrap();
        let config = effective_config(stored(), cli.conn);
        assert_eq!(config.base_url, "https://flag.example.com");
        assert_eq!(config.account_id, Some(7));
        assert_eq!(config.agent_token(), "stored-agent");
    }

    #[test]
    fn absent_flags_keep_stored_config() {
        let cli = Cli::try_parse_from(["chatwoot", "label", "add", "3", "vip"]).unwrap();
        let config = effective_config(stored(), cli.conn);
        assert_eq!(config, stored());
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["chatwoot", "assign", "team", "3", "4", "--agent-token", "flag-agent"])
            .unwrap();
        let config = effective_config(stored(), cli.conn);
        assert_eq!(config.agent_token(), "flag-agent");
        assert!(matches!(cli.command, Command::Assign(AssignCommand::Team { conversation_id: 3, team_id: 4 })));
    }
}
