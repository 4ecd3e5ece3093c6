//! Buy a new address, wait for its first mails, and unlock the locked ones.
//!
//! Run with `ALACCTOKEN="alaccauth..." cargo run --example unlock`.

use std::time::{Duration, Instant};

use autolook_client::{Client, Error, MailQuery};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let token = std::env::var("ALACCTOKEN").expect("set ALACCTOKEN to an account token");
    let client = Client::new(token).await?;

    let balance = client.get_balance().await?;
    println!("Balance: {balance}");
    if balance <= 0.0 {
        eprintln!("Balance is zero, can't continue!");
        return Ok(());
    }

    println!("Stock domains: {:?}", client.api_info().stock_domains);

    let email = client.buy_email("outlook.com").await?;
    info!("Waiting till email: '{email}' receives a new mail");

    let started = Instant::now();
    let new_mails = client
        .wait_for_new_mails(&email, MailQuery::default(), Some(Duration::from_secs(600)))
        .await?;
    info!(
        "New mails after: {:.1} seconds, found mails: {}",
        started.elapsed().as_secs_f64(),
        new_mails.len()
    );
    for mail in &new_mails {
        println!("- Mail NEW:\n{mail}");
    }

    let locked: Vec<String> = new_mails
        .iter()
        .filter(|mail| !mail.unlocked)
        .map(|mail| mail.almailid.clone())
        .collect();
    if !locked.is_empty() {
        info!("Unlocking mails: {}", locked.len());
        let unlocked = client.unlock_mails(&email, locked, true).await?;
        for mail in &unlocked {
            println!("- Mail UNLOCKED:\n{mail}");
        }
    }

    println!("---\nDone");
    Ok(())
}
