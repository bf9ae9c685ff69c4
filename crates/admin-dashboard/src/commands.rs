use admin_client_core::{get_configuration, BootstrapOutcome, Client};
use admin_shared::{
    log_err_as_warn,
    notification::NotificationId,
    req_args::{LoginReqArgs, NotificationListReqArgs},
};
use anyhow::Context as _;
use secrecy::SecretString;
use tracing::info;

use crate::{
    cli::{Cli, Command, NotificationsCommand},
    render::{render_header, render_menu, render_notifications},
};

const CHANNEL_CLOSED: &str = "response channel closed before an answer was sent";

/// Loads the configuration, restores any stored session and then runs the
/// requested command
#[tracing::instrument(skip(cli))]
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let configuration = get_configuration(&cli.config_dir).with_context(|| {
        format!("failed to read configuration from {:?}", cli.config_dir)
    })?;
    info!(environment = configuration.environment.as_str(), "configuration loaded");
    let client =
        Client::from_configuration(&configuration).context("failed to create client")?;

    let outcome = client.bootstrap(|| {}).await.context(CHANNEL_CLOSED)?;
    info!(?outcome, "session bootstrap finished");
    if outcome == BootstrapOutcome::Invalidated {
        println!("Stored session is no longer valid, please sign in again");
    }

    match cli.command {
        Command::Status => status(&client).await,
        Command::Login { email, password } => login(&client, email, password).await,
        Command::Logout => {
            client.logout(|| {}).await.context(CHANNEL_CLOSED)?;
            println!("Signed out");
            Ok(())
        }
        Command::Menu => {
            print!("{}", render_menu(&client.menu()));
            Ok(())
        }
        Command::Notifications(command) => notifications(&client, command).await,
    }
}

async fn status(client: &Client) -> anyhow::Result<()> {
    let Some(identity) = client.user_info() else {
        println!("Not signed in");
        return Ok(());
    };
    let page = client
        .notifications(&NotificationListReqArgs::default(), || {})
        .await
        .context(CHANNEL_CLOSED)?;
    log_err_as_warn!(&page);
    println!("{}", render_header(&identity, page.as_ref().ok()));
    Ok(())
}

async fn login(client: &Client, email: String, password: String) -> anyhow::Result<()> {
    let args = LoginReqArgs::new(email, SecretString::from(password));
    client
        .login(args, || {})
        .await
        .context(CHANNEL_CLOSED)?
        .context("login failed")?;
    let identity = client
        .user_info()
        .context("signed in but no identity available")?;
    println!("Signed in as {}", render_header(&identity, None));
    Ok(())
}

async fn notifications(client: &Client, command: NotificationsCommand) -> anyhow::Result<()> {
    match command {
        NotificationsCommand::List { page, limit } => {
            let page = client
                .notifications(&NotificationListReqArgs::new(page, limit), || {})
                .await
                .context(CHANNEL_CLOSED)??;
            print!("{}", render_notifications(&page));
        }
        NotificationsCommand::Read { id } => {
            client
                .mark_notification_read(&NotificationId::new(id), || {})
                .await
                .context(CHANNEL_CLOSED)??;
            println!("Marked as read");
        }
        NotificationsCommand::ReadAll => {
            client
                .mark_all_notifications_read(|| {})
                .await
                .context(CHANNEL_CLOSED)??;
            println!("All notifications marked as read");
        }
        NotificationsCommand::Delete { id } => {
            client
                .delete_notification(&NotificationId::new(id), || {})
                .await
                .context(CHANNEL_CLOSED)??;
            println!("Deleted");
        }
    }
    Ok(())
}
