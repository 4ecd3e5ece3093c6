//! Print the balance of an authorized account.
//!
//! Run with `ALACCTOKEN="alaccauth..." cargo run --example balance`.

use autolook_client::{Client, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Presentation setup is the caller's job; RUST_LOG=autolook_client=debug
    // prints every SEND/RECV payload.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let token = std::env::var("ALACCTOKEN").expect("set ALACCTOKEN to an account token");

    let client = Client::new(token).await?;
    println!("Balance: {}", client.get_balance().await?);
    Ok(())
}
