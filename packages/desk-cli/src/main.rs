// Check-in desk terminal client.
//
// Drives the core session controller and roster view directly against
// the live identity gateway and member store. One operator, one session,
// one action at a time.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use firestore::{FirestoreClient, FirestoreOptions};
use server_core::domains::auth::{SessionController, SessionState, SignedInUser};
use server_core::domains::member::actions::{check_in, list_members, pre_register};
use server_core::domains::member::models::{Member, Role};
use server_core::domains::member::roster::Roster;
use server_core::kernel::{BaseMemberStore, FirestoreMemberStore, GoogleIdentityGateway};
use server_core::Config;

#[derive(Parser)]
#[command(name = "desk", about = "Doorlist check-in desk")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Pre-register the configured admin list and exit
    SeedAdmins,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep the terminal clean; raise with RUST_LOG when debugging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let client = FirestoreClient::new(FirestoreOptions {
        project_id: config.firestore_project_id.clone(),
        api_key: config.firestore_api_key.clone(),
        auth_token: config.firestore_auth_token.clone(),
    });
    let store = Arc::new(FirestoreMemberStore::new(
        client,
        config.members_collection.clone(),
    ));

    match cli.command {
        Some(Command::SeedAdmins) => seed_admins(&config, store.as_ref()).await,
        None => run_desk(&config, store).await,
    }
}

/// One-shot seeding of the configured admin list, mirroring what an
/// organizer does before the event: grant roles by email so the person
/// becomes an admin on their first sign-in.
async fn seed_admins(config: &Config, store: &dyn BaseMemberStore) -> Result<()> {
    if config.admin_seed.is_empty() {
        println!(
            "{}",
            "No admin seed entries configured (set ADMIN_SEED).".yellow()
        );
        return Ok(());
    }

    println!("Pre-registering {} admins...", config.admin_seed.len());
    for entry in &config.admin_seed {
        match pre_register(&entry.email, &entry.name, Role::Admin, store).await {
            Ok(member) => println!("{} {} ({})", "✓".green(), entry.email, member.id),
            Err(e) => println!("{} {}: {}", "✗".red(), entry.email, e),
        }
    }

    println!(
        "{}",
        "Done. Admins link their account on first sign-in.".green()
    );
    Ok(())
}

async fn run_desk(config: &Config, store: Arc<FirestoreMemberStore>) -> Result<()> {
    let term = Term::stdout();
    print_banner(&term)?;

    let gateway = Arc::new(GoogleIdentityGateway::new(
        config.google_client_id.clone(),
        config.pending_credential_path.clone(),
    ));
    let controller = SessionController::new(gateway, store.clone());

    // Finish any sign-in that completed out-of-band before the menu loop.
    match controller.resume_if_pending().await {
        Ok(true) => println!("{}", "Resumed a pending sign-in.".green()),
        Ok(false) => {}
        Err(e) => println!("{} {}", "Could not resume pending sign-in:".red(), e),
    }

    loop {
        match controller.state().await {
            SessionState::SignedIn(user) => {
                signed_in_menu(&term, &controller, &user, store.as_ref()).await?;
            }
            _ => {
                if !signed_out_menu(&term, &controller).await? {
                    break;
                }
            }
        }
    }

    println!("{}", "Goodbye!".bright_blue());
    Ok(())
}

fn print_banner(term: &Term) -> Result<()> {
    term.clear_screen()?;
    println!(
        "{}",
        "╔════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}",
        "║         Doorlist Check-In Desk         ║".bright_cyan()
    );
    println!(
        "{}",
        "╚════════════════════════════════════════╝".bright_cyan()
    );
    println!();
    Ok(())
}

/// Returns false when the operator chose to quit.
async fn signed_out_menu(term: &Term, controller: &SessionController) -> Result<bool> {
    let options = vec!["Sign in", "Quit"];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Not signed in")
        .items(&options)
        .default(0)
        .interact_on(term)?;

    match selection {
        0 => {
            let credential: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Provider credential (ID token)")
                .interact_text()?;

            match controller.sign_in(credential.trim()).await {
                Ok(user) => {
                    println!("{} {}", "Signed in as".green(), display_name(&user.member));
                }
                Err(e) => println!("{} {}", "Sign-in failed:".red(), e),
            }
            Ok(true)
        }
        1 => Ok(false),
        _ => unreachable!(),
    }
}

async fn signed_in_menu(
    term: &Term,
    controller: &SessionController,
    user: &SignedInUser,
    store: &dyn BaseMemberStore,
) -> Result<()> {
    if user.role == Role::Admin {
        admin_menu(term, controller, store).await
    } else {
        attendee_menu(term, controller, user).await
    }
}

/// Regular attendees see their own record; the roster is only fetched
/// for admins.
async fn attendee_menu(
    term: &Term,
    controller: &SessionController,
    user: &SignedInUser,
) -> Result<()> {
    println!();
    println!("Welcome, {}", display_name(&user.member).bold());
    println!("  Email: {}", user.member.email);
    println!("  Role:  {}", user.role);
    if user.member.checked_in {
        println!("  {}", "You are checked in.".green());
    } else {
        println!("  Not checked in yet - see the desk admin.");
    }

    let options = vec!["Sign out"];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .items(&options)
        .default(0)
        .interact_on(term)?;

    match selection {
        0 => {
            if let Err(e) = controller.sign_out().await {
                println!("{} {}", "Sign-out failed:".red(), e);
            }
            Ok(())
        }
        _ => unreachable!(),
    }
}

async fn admin_menu(
    term: &Term,
    controller: &SessionController,
    store: &dyn BaseMemberStore,
) -> Result<()> {
    // Roster fetch on entering the admin view.
    let mut roster = match list_members(store).await {
        Ok(members) => Roster::new(members),
        Err(e) => {
            println!("{} {}", "Failed to load roster:".red(), e);
            Roster::default()
        }
    };

    loop {
        let stats = roster.stats();
        println!();
        println!(
            "{}",
            format!(
                "Total {}   Checked in {}   Pending {}   Rate {}%",
                stats.total, stats.checked_in, stats.pending, stats.check_in_rate
            )
            .bold()
        );

        let options = vec![
            "Check in an attendee",
            "Search roster",
            "Show full roster",
            "Refresh roster",
            "Sign out",
        ];
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Admin desk")
            .items(&options)
            .default(0)
            .interact_on(term)?;

        match selection {
            0 => check_in_flow(term, &mut roster, store).await?,
            1 => search_flow(&roster)?,
            2 => print_members(roster.members()),
            3 => match list_members(store).await {
                Ok(members) => {
                    roster.refresh(members);
                    println!("{}", "Roster refreshed.".green());
                }
                Err(e) => println!("{} {}", "Failed to refresh roster:".red(), e),
            },
            4 => {
                if let Err(e) = controller.sign_out().await {
                    println!("{} {}", "Sign-out failed:".red(), e);
                }
                return Ok(());
            }
            _ => unreachable!(),
        }
    }
}

async fn check_in_flow(
    term: &Term,
    roster: &mut Roster,
    store: &dyn BaseMemberStore,
) -> Result<()> {
    let query: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Search (name, email, or id; empty for all)")
        .allow_empty(true)
        .interact_text()?;

    let matches: Vec<Member> = roster
        .filter(query.trim())
        .into_iter()
        .filter(|m| !m.checked_in)
        .cloned()
        .collect();

    if matches.is_empty() {
        println!("No pending attendees match '{}'", query.trim());
        return Ok(());
    }

    let labels: Vec<String> = matches.iter().map(member_line).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Check in")
        .items(&labels)
        .default(0)
        .interact_on(term)?;
    let target = &matches[selection];

    match check_in(&target.id, store).await {
        Ok(updated) => {
            let at = updated.checked_in_at.unwrap_or_else(chrono::Utc::now);
            roster.apply_check_in(&updated.id, at);
            println!("{} {} checked in", "✓".green(), display_name(&updated));
        }
        Err(e) => println!("{} {}", "Check-in failed:".red(), e),
    }

    Ok(())
}

fn search_flow(roster: &Roster) -> Result<()> {
    let query: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Search (name, email, or id)")
        .allow_empty(true)
        .interact_text()?;

    let matches: Vec<&Member> = roster.filter(query.trim());
    if matches.is_empty() {
        println!("No members match '{}'", query.trim());
    } else {
        for member in matches {
            println!("{}", member_line(member));
        }
    }
    Ok(())
}

fn print_members(members: &[Member]) {
    if members.is_empty() {
        println!("No members found");
        return;
    }
    for member in members {
        println!("{}", member_line(member));
    }
}

fn member_line(member: &Member) -> String {
    let mark = if member.checked_in { "✓" } else { " " };
    let when = member
        .checked_in_at
        .map(|at| format!(" at {}", at.format("%H:%M")))
        .unwrap_or_default();
    format!(
        "[{}] {} <{}>{}",
        mark,
        display_name(member),
        member.email,
        when
    )
}

fn display_name(member: &Member) -> &str {
    if member.name.is_empty() {
        &member.email
    } else {
        &member.name
    }
}
