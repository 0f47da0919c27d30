//! Sign in, sign out, and account state.

use std::io::{BufRead, Write};

use anyhow::Result;
use huddle_core::models::AuthResponse;
use huddle_core::Session;

use crate::commands::Ctx;
use crate::output;

pub async fn login(
    ctx: &Ctx,
    tenant: Option<String>,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let tenant = tenant.unwrap_or_else(|| ctx.session.tenant_slug().to_string());
    let password = read_password(password)?;

    match ctx.client.login(&tenant, email, &password).await {
        Ok(auth) => finish_sign_in(ctx, &tenant, auth),
        Err(err) if err.is_pending_approval() => {
            println!("Your account is still awaiting admin approval.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn register(
    ctx: &Ctx,
    tenant: Option<String>,
    name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let tenant = tenant.unwrap_or_else(|| ctx.session.tenant_slug().to_string());
    let password = read_password(password)?;

    let auth = ctx.client.register(&tenant, name, email, &password).await?;
    finish_sign_in(ctx, &tenant, auth)
}

pub fn logout(ctx: &Ctx) -> Result<()> {
    ctx.store.clear()?;
    println!("Signed out.");
    Ok(())
}

pub fn whoami(ctx: &Ctx) -> Result<()> {
    if ctx.json {
        return output::print_json(&ctx.session.user);
    }
    match &ctx.session.user {
        Some(user) if ctx.session.is_authenticated() => {
            println!("{} <{}>", user.display_name(), user.email);
            println!("Role:   {}", user.role);
            println!("Tenant: {}", ctx.session.tenant_slug());
        }
        _ => println!("Not signed in."),
    }
    Ok(())
}

pub async fn status(ctx: &Ctx) -> Result<()> {
    println!("Server: {}", ctx.client.base_url());
    println!("Tenant: {}", ctx.session.tenant_slug());
    match &ctx.session.user {
        Some(user) if ctx.session.is_authenticated() => {
            println!("User:   {} ({})", user.display_name(), user.role);
        }
        _ => println!("User:   not signed in"),
    }

    match ctx.client.health(&ctx.session).await {
        Ok(response) => {
            let health = response.data["status"].as_str().unwrap_or("ok");
            println!("Health: {}", health);
        }
        Err(err) => {
            eprintln!("huddle: server unreachable ({err})");
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Keep the token only for accounts the backend will actually serve; an
/// unapproved account gets a notice instead of a saved session.
fn finish_sign_in(ctx: &Ctx, tenant: &str, auth: AuthResponse) -> Result<()> {
    if auth.user.is_approved() {
        let session = Session::authenticated(auth.access_token, tenant, auth.user);
        ctx.store.save(&session)?;
        if let Some(user) = &session.user {
            println!(
                "Signed in as {} ({}) on tenant '{}'.",
                user.display_name(),
                user.role,
                session.tenant_slug()
            );
        }
    } else {
        println!("Account created. An admin has to approve it before you can sign in.");
    }
    Ok(())
}

fn read_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
