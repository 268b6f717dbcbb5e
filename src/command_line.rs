use anyhow::{bail, Result};
use std::io::{self, Write};
use tracing::info;

use crate::config::Command;
use crate::display::{format_latency, render_record, render_table};
use crate::dynamodb::Column;
use crate::error::DashboardError;
use crate::query::QueryOutcome;
use crate::session::Session;
use crate::table_client::Fetched;

const DEFAULT_ROWS: usize = 10;

/// Runs the interactive dashboard.
///
/// This function enters a loop that prompts the user for commands and executes them.
/// The supported commands are:
/// - create: Create the table with the `(date, id)` key schema
/// - insert: Insert synthetic records
/// - fetch: Show every record of the table
/// - query: Pick a date and an ID and look up that record
/// - log: Show the activity log, most recent first
/// - help: List the commands
/// - exit: Exit the program
///
/// Store failures are reported and the loop carries on. Only a broken
/// terminal ends the loop with an error; closing stdin ends it cleanly.
pub async fn run(session: &mut Session) -> Result<()> {
    print_help();
    loop {
        let Some(command) = read_input("\nEnter command (create/insert/fetch/query/log/help/exit): ")?
        else {
            break;
        };
        match command.to_lowercase().as_str() {
            "create" => create_table(session).await?,
            "insert" => insert_records(session).await?,
            "fetch" => fetch_records(session).await?,
            "query" => query_record(session).await?,
            "log" => print_log(session),
            "help" => print_help(),
            "exit" | "quit" => break,
            "" => continue,
            _ => println!("Unknown command. Please try again."),
        }
    }
    info!("Session ended with {} activity log entries", session.log().len());
    Ok(())
}

/// Runs a single action without prompting.
///
/// Fails after reporting if the action did not succeed.
pub async fn run_once(session: &mut Session, command: Command) -> Result<()> {
    if !matches!(command, Command::Shell) && session.table_name().is_empty() {
        bail!("a table name is required (--table or DASHBOARD_TABLE)");
    }
    let succeeded = match command {
        Command::Shell => return run(session).await,
        Command::Create => report_create(session).await,
        Command::Insert { rows } => report_insert(session, rows as usize).await,
        Command::Fetch => report_fetch(session).await,
        Command::Query {
            date,
            id,
            filter,
            columns,
        } => {
            session.set_filter(&filter);
            session.set_columns(columns.0);
            select_and_query(session, &date, &id).await
        }
    };
    if let Some(entry) = session.log().last() {
        println!("{entry}");
    }
    if !succeeded {
        bail!("action failed");
    }
    Ok(())
}

fn print_help() {
    println!("\n--- Table Dashboard ---");
    println!("create  Create a table keyed by (date, id)");
    println!("insert  Insert synthetic records");
    println!("fetch   Show every record");
    println!("query   Look up a single record");
    println!("log     Show the activity log");
    println!("exit    Leave the dashboard");
}

/// Asks for the table name, keeping the session's current one on empty input.
///
/// Returns `false` if there is still no table name afterwards.
fn prompt_table_name(session: &mut Session) -> Result<bool> {
    let current = session.table_name().to_string();
    let example = (!current.is_empty()).then_some(current.as_str());
    let name = prompt("Enter table name", example)?;
    if !name.is_empty() {
        session.set_table_name(&name);
    }
    if session.table_name().is_empty() {
        println!("Enter a valid table name to continue.");
        return Ok(false);
    }
    Ok(true)
}

async fn create_table(session: &mut Session) -> Result<()> {
    if prompt_table_name(session)? {
        report_create(session).await;
    }
    Ok(())
}

async fn report_create(session: &mut Session) -> bool {
    match session.create_table().await {
        Ok(()) => {
            println!("Table '{}' created successfully!", session.table_name());
            true
        }
        Err(e @ DashboardError::AlreadyExists(_)) => {
            println!("Warning: {e}.");
            false
        }
        Err(e) => {
            println!("{e}");
            false
        }
    }
}

async fn insert_records(session: &mut Session) -> Result<()> {
    if !prompt_table_name(session)? {
        return Ok(());
    }
    let rows = loop {
        let input = prompt(
            "Enter number of records",
            Some(DEFAULT_ROWS.to_string().as_str()),
        )?;
        match parse_row_count(&input, DEFAULT_ROWS) {
            Some(rows) => break rows,
            None => println!("Please enter a positive whole number."),
        }
    };
    report_insert(session, rows).await;
    Ok(())
}

async fn report_insert(session: &mut Session, rows: usize) -> bool {
    match session.insert_records(rows).await {
        Ok(inserted) => {
            println!(
                "Inserted {} records successfully in {}.",
                inserted.count,
                format_latency(inserted.latency)
            );
            true
        }
        Err(e) => {
            println!("{e}");
            false
        }
    }
}

async fn fetch_records(session: &mut Session) -> Result<()> {
    if prompt_table_name(session)? {
        report_fetch(session).await;
    }
    Ok(())
}

async fn report_fetch(session: &mut Session) -> bool {
    match session.fetch_records().await {
        Ok(Fetched::Empty { .. }) => {
            println!("No records found.");
            true
        }
        Ok(Fetched::Records { items, latency }) => {
            println!("\n--- Fetched Data ({} records) ---", items.len());
            println!("{}", render_table(&items, &Column::ALL));
            println!("Latency: {}", format_latency(latency));
            true
        }
        Err(e) => {
            println!("{e}");
            false
        }
    }
}

/// Walks the operator through date, ID, filter and column selection, then
/// runs lookups until they are done with the chosen date.
async fn query_record(session: &mut Session) -> Result<()> {
    if !prompt_table_name(session)? {
        return Ok(());
    }

    let dates = match session.load_dates().await {
        Ok(dates) if dates.is_empty() => {
            println!("Warning: No data available.");
            return Ok(());
        }
        Ok(dates) => dates,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };
    let date = prompt_choice("Select date", &dates, session.query().partition_key())?;

    let ids = match session.choose_date(&date).await {
        Ok(ids) if ids.is_empty() => {
            println!("Warning: No IDs for this date.");
            return Ok(());
        }
        Ok(ids) => ids,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let filter = prompt("Filter by factory name (blank for none)", None)?;
    session.set_filter(&filter);

    loop {
        let input = prompt("Columns to show, comma separated (blank for all)", None)?;
        match Column::parse_list(&input) {
            Ok(columns) => {
                session.set_columns(columns);
                break;
            }
            Err(e) => println!("{e}"),
        }
    }

    loop {
        let id = prompt_choice("Select record ID", &ids, None)?;
        if let Err(e) = session.choose_id(&id) {
            println!("{e}");
            continue;
        }
        query_selected(session).await;

        if !prompt_bool("Query another ID for this date?", false)? {
            break;
        }
    }
    Ok(())
}

async fn select_and_query(session: &mut Session, date: &str, id: &str) -> bool {
    if let Err(e) = session.load_dates().await {
        println!("{e}");
        return false;
    }
    if let Err(e) = session.choose_date(date).await {
        println!("{e}");
        return false;
    }
    if let Err(e) = session.choose_id(id) {
        println!("{e}");
        return false;
    }
    query_selected(session).await
}

async fn query_selected(session: &mut Session) -> bool {
    match session.run_query().await {
        Ok(QueryOutcome::Found { item, latency }) => {
            println!("\n--- Query Result ---");
            println!("{}", render_record(&item, session.query().columns()));
            println!("Latency: {}", format_latency(latency));
            true
        }
        Ok(QueryOutcome::NotFound { .. }) => {
            println!("Warning: No record found.");
            false
        }
        Ok(QueryOutcome::FilterMismatch { filter, factory }) => {
            println!(
                "Warning: Record factory '{}' does not match filter '{filter}'.",
                factory.as_deref().unwrap_or("<none>")
            );
            false
        }
        Err(e) => {
            println!("{e}");
            false
        }
    }
}

fn print_log(session: &Session) {
    println!("\n--- Activity Log ---");
    if session.log().is_empty() {
        println!("No activities yet.");
        return;
    }
    session
        .log()
        .render_all()
        .for_each(|entry| println!("{entry}"));
}

/// Parses a positive row count; blank input picks `default`.
pub(crate) fn parse_row_count(input: &str, default: usize) -> Option<usize> {
    let input = input.trim();
    if input.is_empty() {
        return Some(default);
    }
    input.parse::<usize>().ok().filter(|rows| *rows > 0)
}

/// Matches input against a numbered list of options.
///
/// Accepts either the 1-based position or the option itself.
pub(crate) fn resolve_choice<'a>(input: &str, options: &'a [String]) -> Option<&'a str> {
    let input = input.trim();
    if let Some(option) = options.iter().find(|option| option.as_str() == input) {
        return Some(option.as_str());
    }
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .map(String::as_str)
}

fn prompt_choice(label: &str, options: &[String], current: Option<&str>) -> Result<String> {
    for (i, option) in options.iter().enumerate() {
        println!("  {:>3}) {}", i + 1, option);
    }
    let default = current
        .filter(|c| options.iter().any(|o| o == c))
        .or_else(|| options.first().map(String::as_str));
    loop {
        let input = prompt(label, default)?;
        if input.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
        }
        match resolve_choice(&input, options) {
            Some(choice) => return Ok(choice.to_string()),
            None => println!("Pick a number from 1 to {} or type a listed value.", options.len()),
        }
    }
}

/// Reads one trimmed line. `None` means stdin was closed.
fn read_input(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

/// Prompts the user for input and returns the entered string.
///
/// `default` is shown in brackets; the caller decides what empty input means.
fn prompt(message: &str, default: Option<&str>) -> Result<String> {
    let full_message = if let Some(default) = default {
        format!("{} [{}]: ", message, default)
    } else {
        format!("{}: ", message)
    };
    match read_input(&full_message)? {
        Some(input) => Ok(input),
        None => bail!("input closed"),
    }
}

fn prompt_bool(message: &str, default: bool) -> Result<bool> {
    let input = prompt(
        &format!("{} (y/n)", message),
        Some(if default { "y" } else { "n" }),
    )?;
    Ok(input.to_lowercase().starts_with('y') || (input.is_empty() && default))
}
