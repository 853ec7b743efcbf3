use super::{ChatError, Config};
use crate::prelude::*;
use crate::{err, err_ctx, Result};
use grammers_client::{Client, SignInError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Signs in to the user account asking for the missing credentials on stdin
pub(super) async fn sign_in(client: &Client, cfg: &Config) -> Result {
    info!("The session is not authorized, signing in...");

    let phone = match &cfg.phone {
        Some(phone) => phone.clone(),
        None => prompt("Enter the phone number of the account: ").await?,
    };

    let token = client
        .request_login_code(&phone)
        .await
        .map_err(err_ctx!(ChatError::Login))?;

    let code = prompt("Enter the code sent by Telegram: ").await?;

    match client.sign_in(&token, &code).await {
        Ok(_) => {}
        Err(SignInError::PasswordRequired(password_token)) => {
            let hint = password_token
                .hint()
                .map(|hint| hint.to_string())
                .unwrap_or_default();

            let password = prompt(&format!("Enter the 2FA password (hint: {hint}): ")).await?;

            client
                .check_password(password_token, password.as_bytes())
                .await
                .map_err(err_ctx!(ChatError::Login))?;
        }
        Err(source) => return Err(err!(ChatError::Login { source })),
    }

    info!("Signed in to Telegram");

    Ok(())
}

async fn prompt(message: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();

    stdout
        .write_all(message.as_bytes())
        .await
        .map_err(err_ctx!(ChatError::ReadInput))?;

    stdout.flush().await.map_err(err_ctx!(ChatError::ReadInput))?;

    let mut line = String::new();

    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(err_ctx!(ChatError::ReadInput))?;

    Ok(line.trim().to_owned())
}
