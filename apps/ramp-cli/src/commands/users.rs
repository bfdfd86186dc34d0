//! User management CLI commands

use crate::config::GlobalArgs;
use crate::error::{CliError, CliResult};
use crate::output::{or_dash, truncate};
use clap::{Args, Subcommand};
use ramp_client::models::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use ramp_client::{
    CreateInviteRequest, DeferredTaskStatus, ListUsersParams, RampClient, TaskStatus, User,
    UserRole,
};
use std::time::Duration;

/// User management commands
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommands,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List users in the business
    List(ListArgs),
    /// Invite a new user (creates a deferred task)
    Invite(InviteArgs),
    /// Show the status of a deferred user task
    TaskStatus(TaskStatusArgs),
    /// Check live responses against the documented response shapes
    CheckContract(CheckContractArgs),
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Follow pagination and fetch every matching user
    #[arg(long)]
    pub all: bool,

    /// Users per page (2-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Filter by email address
    #[arg(long)]
    pub email: Option<String>,

    /// Filter by department ID
    #[arg(long)]
    pub department_id: Option<String>,

    /// Filter by location ID
    #[arg(long)]
    pub location_id: Option<String>,

    /// Filter by role, e.g. BUSINESS_ADMIN
    #[arg(long)]
    pub role: Option<UserRole>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the invite command
#[derive(Args, Debug)]
pub struct InviteArgs {
    /// Email address of the new user
    pub email: String,

    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: String,

    /// Role to assign
    #[arg(long, default_value = "GUEST_USER")]
    pub role: UserRole,

    #[arg(long)]
    pub department_id: Option<String>,

    #[arg(long)]
    pub location_id: Option<String>,

    /// Direct manager's user ID
    #[arg(long)]
    pub manager_id: Option<String>,

    /// Poll the deferred task until it finishes
    #[arg(long)]
    pub wait: bool,

    /// Seconds between polls when waiting
    #[arg(long, default_value = "2")]
    pub poll_interval: u64,

    /// Maximum number of polls when waiting
    #[arg(long, default_value = "30")]
    pub max_polls: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the task-status command
#[derive(Args, Debug)]
pub struct TaskStatusArgs {
    /// Deferred task ID returned by `users invite`
    pub task_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check-contract command
#[derive(Args, Debug)]
pub struct CheckContractArgs {
    /// Also check the status response of this deferred task
    #[arg(long)]
    pub task_id: Option<String>,

    /// Users per page to fetch for the check
    #[arg(long)]
    pub page_size: Option<u32>,
}

/// Execute user commands
pub async fn execute(args: UsersArgs, global: &GlobalArgs) -> CliResult<()> {
    let client = global.client()?;
    match args.command {
        UsersCommands::List(a) => execute_list(&client, a).await,
        UsersCommands::Invite(a) => execute_invite(&client, a).await,
        UsersCommands::TaskStatus(a) => execute_task_status(&client, a).await,
        UsersCommands::CheckContract(a) => execute_check_contract(&client, a).await,
    }
}

async fn execute_list(client: &RampClient, args: ListArgs) -> CliResult<()> {
    validate_page_size(args.page_size)?;
    let params = ListUsersParams {
        page_size: args.page_size,
        email: args.email,
        department_id: args.department_id,
        location_id: args.location_id,
        role: args.role,
        ..ListUsersParams::default()
    };

    let (users, next) = if args.all {
        (client.users().list_all(&params).await?, None)
    } else {
        let page = client.users().list(&params).await?;
        (page.data, page.page.next)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else if users.is_empty() {
        println!("No users found.");
    } else {
        print_user_table(&users);
        println!("\nShowing {} users", users.len());
        if next.is_some() {
            println!("More users available. Use --all to fetch every page.");
        }
    }

    Ok(())
}

async fn execute_invite(client: &RampClient, args: InviteArgs) -> CliResult<()> {
    let request = build_invite(&args);
    let task = client.users().create_invite(&request).await?;

    if !args.wait {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&task)?);
        } else {
            println!("Invite accepted for {}", request.email);
            println!("Task ID: {}", task.id);
            println!("\nCheck progress with: ramp users task-status {}", task.id);
        }
        return Ok(());
    }

    let status = client
        .users()
        .wait_for_deferred_task(
            &task.id,
            Duration::from_secs(args.poll_interval),
            args.max_polls,
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_task_status(&status);
    }

    if status.status == TaskStatus::Error {
        return Err(CliError::TaskFailed {
            task_id: status.id.clone(),
            message: status
                .data
                .error
                .clone()
                .unwrap_or_else(|| "no error detail returned".to_string()),
        });
    }

    Ok(())
}

async fn execute_task_status(client: &RampClient, args: TaskStatusArgs) -> CliResult<()> {
    let status = client
        .users()
        .fetch_deferred_task_status(&args.task_id)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_task_status(&status);
    }

    Ok(())
}

async fn execute_check_contract(client: &RampClient, args: CheckContractArgs) -> CliResult<()> {
    validate_page_size(args.page_size)?;
    let params = ListUsersParams {
        page_size: args.page_size,
        ..ListUsersParams::default()
    };

    let checked = client.users().check_list_contract(&params).await?;
    println!("\u{2713} GET /users matches contract ({checked} users checked)");

    if let Some(task_id) = args.task_id {
        client
            .users()
            .check_deferred_task_contract(&task_id)
            .await?;
        println!("\u{2713} GET /users/deferred/status/{task_id} matches contract");
    }

    Ok(())
}

fn build_invite(args: &InviteArgs) -> CreateInviteRequest {
    let mut request = CreateInviteRequest::new(
        args.email.clone(),
        args.first_name.clone(),
        args.last_name.clone(),
        args.role,
    );
    if let Some(department_id) = &args.department_id {
        request = request.with_department(department_id.clone());
    }
    if let Some(location_id) = &args.location_id {
        request = request.with_location(location_id.clone());
    }
    if let Some(manager_id) = &args.manager_id {
        request = request.with_manager(manager_id.clone());
    }
    request
}

fn validate_page_size(page_size: Option<u32>) -> CliResult<()> {
    match page_size {
        Some(size) if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) => {
            Err(CliError::Validation(format!(
                "--page-size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
            )))
        }
        _ => Ok(()),
    }
}

fn print_user_table(users: &[User]) {
    println!(
        "{:<38} {:<30} {:<24} {:<20} {:<16}",
        "ID", "EMAIL", "NAME", "ROLE", "STATUS"
    );
    println!("{}", "-".repeat(132));

    for user in users {
        println!(
            "{:<38} {:<30} {:<24} {:<20} {:<16}",
            truncate(&user.id, 38),
            truncate(&user.email, 28),
            truncate(&user.full_name(), 22),
            user.role,
            user.status
        );
    }
}

fn print_task_status(status: &DeferredTaskStatus) {
    println!("Task: {}", status.id);
    println!("{}", "\u{2501}".repeat(50));
    println!("Status:         {}", status.status);
    println!(
        "Acting User:    {}",
        or_dash(status.context.acting_user_id.as_deref())
    );
    println!("User ID:        {}", or_dash(status.data.user_id.as_deref()));
    if let Some(ref error) = status.data.error {
        println!("Error:          {error}");
    }
}
