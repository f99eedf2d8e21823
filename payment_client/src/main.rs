use common::money;
use dotenvy::dotenv;
use payment_client::client::PaymentClient;
use payment_client::config::ClientConfig;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::FmtSubscriber;

fn print_menu() {
    println!("\n====== Multi-Bank Payment System ======");
    println!("1. Connect to server");
    println!("2. Authenticate");
    println!("3. Check balance");
    println!("4. Make payment");
    println!("5. Test idempotency (same payment twice)");
    println!("6. View pending transactions");
    println!("7. Retry pending transactions");
    println!("8. Disconnect");
    println!("9. Exit");
    println!("=======================================");
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> String {
    println!("{}", label);
    match lines.next_line().await {
        Ok(Some(line)) => line.trim().to_string(),
        _ => String::new(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Cargar variables de entorno
    dotenv().ok();

    // 2. Configurar Logging/Tracing (WARN para no ensuciar el menu)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let client = PaymentClient::new(ClientConfig::from_env())?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_payment_id: Option<String> = None;

    println!("Welcome to the Multi-Bank Payment System");
    println!("----------------------------------------");

    loop {
        print_menu();
        let choice = prompt(&mut lines, "Enter your choice (1-9):").await;

        match choice.as_str() {
            "1" => {
                if client.is_connected() {
                    println!("Already connected to the server");
                    continue;
                }

                println!("Connecting...");
                match client.connect().await {
                    Ok(()) => println!("Successfully connected to payment gateway"),
                    Err(e) => println!("Connection failed: {}", e),
                }
            }
            "2" => {
                if !client.is_connected() {
                    println!("Not connected to server. Please connect first");
                    continue;
                }

                if let Some(token) = client.token() {
                    println!("Already authenticated with token: {}", token);
                    let again = prompt(&mut lines, "Do you want to re-authenticate? (y/n):").await;
                    if again.to_lowercase() != "y" {
                        continue;
                    }
                }

                let username = prompt(&mut lines, "Username:").await;
                let password = prompt(&mut lines, "Password:").await;
                let bank_name = prompt(&mut lines, "Bank name:").await;

                println!("Authenticating...");
                match client.authenticate(&username, &password, &bank_name).await {
                    Ok((true, _)) => println!(
                        "Authentication successful. Token: {}",
                        client.token().unwrap_or_default()
                    ),
                    Ok((false, message)) => println!("Authentication failed: {}", message),
                    Err(e) => println!("Authentication failed: {}", e),
                }
            }
            "3" => {
                if !client.is_connected() || client.token().is_none() {
                    println!("Not connected or not authenticated");
                    continue;
                }

                println!("Checking account balance...");
                match client.check_balance().await {
                    Ok((true, balance, _)) => println!("Your current balance: {}", balance),
                    Ok((false, _, message)) => {
                        println!("Failed to retrieve balance: {}", message)
                    }
                    Err(e) => println!("Failed to retrieve balance: {}", e),
                }
            }
            "4" => {
                if !client.is_connected() || client.token().is_none() {
                    println!("Not connected or not authenticated");
                    continue;
                }

                let receiver_account = prompt(&mut lines, "Enter receiver account ID:").await;
                let receiver_bank = prompt(&mut lines, "Enter receiver bank name:").await;
                let amount = prompt(&mut lines, "Enter amount to send:").await;

                if let Err(e) = money::parse_amount(&amount) {
                    println!("{}", e);
                    continue;
                }

                println!("Processing payment...");
                match client
                    .make_payment(&receiver_account, &receiver_bank, &amount, None)
                    .await
                {
                    Ok(attempt) => {
                        last_payment_id = Some(attempt.payment_id.clone());
                        if attempt.success {
                            println!("Payment successful! Message: {}", attempt.message);
                            println!(
                                "Payment ID: {} (save this for idempotency testing)",
                                attempt.payment_id
                            );
                        } else {
                            println!("Payment failed: {}", attempt.message);
                            if attempt.queued {
                                println!(
                                    "Transaction saved to pending queue with ID: {}",
                                    attempt.payment_id
                                );
                            }
                        }
                    }
                    Err(e) => println!("Payment failed: {}", e),
                }
            }
            "5" => {
                if !client.is_connected() || client.token().is_none() {
                    println!("Not connected or not authenticated");
                    continue;
                }

                println!("\n--- Idempotency Test ---");
                println!("This will send the same payment twice to test idempotency");

                let payment_id = match &last_payment_id {
                    Some(last) => {
                        let reuse =
                            prompt(&mut lines, &format!("Use last payment ID ({})? (y/n):", last))
                                .await;
                        if reuse.to_lowercase() == "y" {
                            last.clone()
                        } else {
                            prompt(&mut lines, "Enter payment ID to reuse:").await
                        }
                    }
                    None => prompt(&mut lines, "Enter payment ID to reuse:").await,
                };

                if payment_id.is_empty() {
                    println!("Payment ID is required for idempotency testing");
                    continue;
                }

                let receiver_account = prompt(&mut lines, "Enter receiver account ID:").await;
                let receiver_bank = prompt(&mut lines, "Enter receiver bank name:").await;
                let amount = prompt(&mut lines, "Enter amount to send:").await;

                if let Err(e) = money::parse_amount(&amount) {
                    println!("{}", e);
                    continue;
                }

                println!("\nSending first payment...");
                match client
                    .make_payment(&receiver_account, &receiver_bank, &amount, Some(&payment_id))
                    .await
                {
                    Ok(attempt) if attempt.success => {
                        println!("First payment successful: {}", attempt.message)
                    }
                    Ok(attempt) => println!("First payment failed: {}", attempt.message),
                    Err(e) => println!("First payment failed: {}", e),
                }

                println!("Sending second payment with same payment_id...");
                match client
                    .make_payment(&receiver_account, &receiver_bank, &amount, Some(&payment_id))
                    .await
                {
                    Ok(attempt) if attempt.success => {
                        println!("Second payment successful: {}", attempt.message)
                    }
                    Ok(attempt) => println!("Second payment failed: {}", attempt.message),
                    Err(e) => println!("Second payment failed: {}", e),
                }

                println!("\nIdempotency test complete. Check the gateway logs to verify if");
                println!("the second request was processed or returned from cache.");
            }
            "6" => {
                let pending = client.pending_payments();

                if pending.is_empty() {
                    println!("No pending transactions found");
                } else {
                    println!("\n--- Pending Transactions ---");
                    println!("Total: {} pending transactions", pending.len());

                    for (i, (payment_id, tx)) in pending.iter().enumerate() {
                        println!("\n{}. Payment ID: {}", i + 1, payment_id);
                        println!("   Receiver: {} at {}", tx.receiver_account, tx.receiver_bank);
                        println!("   Amount: {}", tx.amount);
                        println!("   Timestamp: {}", tx.created_at);
                    }
                }
            }
            "7" => {
                if !client.is_connected() || client.token().is_none() {
                    println!("Not connected or not authenticated");
                    continue;
                }

                println!("Retrying pending transactions...");
                match client.retry_pending().await {
                    Ok(report) => println!("{}", report),
                    Err(e) => println!("Retry failed: {}", e),
                }
            }
            "8" => {
                if !client.is_connected() {
                    println!("Not connected to server");
                    continue;
                }

                if client.disconnect().await {
                    println!("Disconnected from server");
                } else {
                    println!("Failed to disconnect");
                }
            }
            "9" => {
                println!("Exiting. Goodbye!");
                if client.is_connected() {
                    client.disconnect().await;
                }
                break;
            }
            _ => println!("Invalid choice. Please enter a number between 1 and 9"),
        }
    }

    Ok(())
}
