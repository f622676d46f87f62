use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use darkroom_client::models::OrderRequest;
use darkroom_client::{
    Config, DarkroomClient, LocalPhoto, ShareAccess, UploadOutcome, UploadStatus,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "darkroom")]
#[command(about = "Client delivery platform for photographers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new account
    SignUp {
        email: String,
        password: String,
    },
    /// Confirm a registered account with the emailed code
    Verify {
        email: String,
        code: String,
    },
    /// Sign in and persist the session
    SignIn {
        email: String,
        password: String,
    },
    /// Drop the persisted session
    SignOut,
    /// List collections
    Collections,
    /// List galleries in a collection
    Galleries {
        collection_id: String,
    },
    /// List photos in a gallery
    Photos {
        gallery_id: String,
    },
    /// Upload image files into a gallery
    Upload {
        gallery_id: String,
        /// Image files, uploaded in the given order
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
    /// Share a gallery (or move the expiry of an active share)
    Share {
        gallery_id: String,
        /// Days from now until the link expires
        #[arg(long, default_value = "30", conflicts_with = "expiry")]
        days: i64,
        /// Exact expiry as an RFC 3339 timestamp
        #[arg(long)]
        expiry: Option<String>,
    },
    /// Stop sharing a gallery immediately
    StopSharing {
        gallery_id: String,
    },
    /// List received orders
    Orders,
    /// Browse a shared gallery as a client would
    ClientPhotos {
        share_url: String,
    },
    /// Submit a photo order against a shared gallery
    ClientOrder {
        share_url: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        comment: Option<String>,
        /// Photo ids to order
        #[arg(required = true)]
        photo_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::SignUp { email, password } => {
            let client = DarkroomClient::from_env()?;
            let reply = client.sign_up(&email, &password).await?;
            println!("{}", reply.message);
        }
        Command::Verify { email, code } => {
            let client = DarkroomClient::from_env()?;
            let reply = client.verify_account(&email, &code).await?;
            println!("{}", reply.message);
        }
        Command::SignIn { email, password } => {
            let client = DarkroomClient::from_env()?;
            client.sign_in(&email, &password).await?;
            println!("Signed in as {}", email);
        }
        Command::SignOut => {
            let client = DarkroomClient::from_env()?;
            client.sign_out().await;
            println!("Signed out");
        }
        Command::Collections => {
            let client = DarkroomClient::from_env()?;
            let collections = client.collections().await?;
            println!("{}", serde_json::to_string_pretty(&collections)?);
        }
        Command::Galleries { collection_id } => {
            let client = DarkroomClient::from_env()?;
            let galleries = client.galleries(&collection_id).await?;
            println!("{}", serde_json::to_string_pretty(&galleries)?);
        }
        Command::Photos { gallery_id } => {
            let client = DarkroomClient::from_env()?;
            let photos = client.gallery_photos(&gallery_id).await?;
            println!("{}", serde_json::to_string_pretty(&photos)?);
        }
        Command::Upload { gallery_id, files } => {
            let client = DarkroomClient::from_env()?;

            let mut photos = Vec::with_capacity(files.len());
            for file in &files {
                let photo = LocalPhoto::from_path(file)
                    .await
                    .with_context(|| format!("failed to read {}", file.display()))?;
                photos.push(photo);
            }

            // Ctrl-C abandons grants that have not reached storage yet;
            // confirmed files stay confirmed.
            let cancel = CancellationToken::new();
            let signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    signal.cancel();
                }
            });

            let batch = client
                .uploads()
                .upload_batch(&gallery_id, photos, cancel)
                .await?;
            for outcome in &batch.outcomes {
                println!("{}", describe(outcome));
            }
            if !batch.fully_confirmed() {
                anyhow::bail!(
                    "{} of {} files did not confirm",
                    batch.unconfirmed().count(),
                    batch.outcomes.len()
                );
            }
        }
        Command::Share {
            gallery_id,
            days,
            expiry,
        } => {
            let client = DarkroomClient::from_env()?;
            let expiry = match expiry {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .context("expiry must be RFC 3339, e.g. 2027-03-01T00:00:00Z")?
                    .with_timezone(&Utc),
                None => Utc::now() + Duration::days(days),
            };

            let gallery = client.gallery(&gallery_id).await?;
            client.sharing().hydrate_from_gallery(&gallery).await;

            let link = client.sharing().share(&gallery_id, expiry).await?;
            println!("{}", link.share_url);
            println!("expires {}", link.sharing_expiry);
        }
        Command::StopSharing { gallery_id } => {
            let client = DarkroomClient::from_env()?;
            let gallery = client.gallery(&gallery_id).await?;
            client.sharing().hydrate_from_gallery(&gallery).await;

            client.sharing().stop(&gallery_id).await?;
            println!("Sharing stopped for {}", gallery_id);
        }
        Command::Orders => {
            let client = DarkroomClient::from_env()?;
            let orders = client.orders().await?;
            println!("{}", serde_json::to_string_pretty(&orders)?);
        }
        Command::ClientPhotos { share_url } => {
            let share = ShareAccess::from_share_url(&config, &share_url)?;
            let photos = share.photos().await?;
            println!("{}", serde_json::to_string_pretty(&photos)?);
        }
        Command::ClientOrder {
            share_url,
            email,
            comment,
            photo_ids,
        } => {
            let share = ShareAccess::from_share_url(&config, &share_url)?;
            let order = share
                .submit_order(&OrderRequest {
                    client_email: email,
                    comment: comment.unwrap_or_default(),
                    photo_ids,
                })
                .await?;
            println!("Order {} submitted", order.id);
        }
    }

    Ok(())
}

fn describe(outcome: &UploadOutcome) -> String {
    match &outcome.status {
        UploadStatus::Confirmed => format!("confirmed   {}", outcome.original_filename),
        UploadStatus::UploadedUnconfirmed(err) => format!(
            "unconfirmed {} ({err})",
            outcome.original_filename
        ),
        UploadStatus::Failed(err) => format!("failed      {} ({err})", outcome.original_filename),
        UploadStatus::Aborted => format!("aborted     {}", outcome.original_filename),
    }
}
