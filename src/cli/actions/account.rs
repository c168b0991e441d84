use crate::cli::globals::GlobalArgs;
use crate::console::{
    account::{self, Landing, RegisterForm},
    ApiClient, ImageBlob, Session,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Login {
    pub username: String,
    pub password: SecretString,
    pub landing: Landing,
}

#[derive(Debug)]
pub struct Register {
    pub username: String,
    pub password: SecretString,
    pub email: String,
    pub role: String,
    pub student_type: String,
    pub college_name: Option<String>,
    pub photo: Option<String>,
}

/// # Errors
/// Returns an error if sign-in fails or the session cannot be stored.
pub async fn login(args: Login, globals: &GlobalArgs) -> Result<()> {
    let mut api = ApiClient::new(&globals.api_url, Session::new())?;
    let session = account::login(&api, &args.username, &args.password).await?;

    let store = globals.session_store();
    store.save(&session)?;
    info!(session_file = %store.path().display(), "session stored");

    api.set_session(session);
    match account::me(&api).await {
        Ok(user) => println!("Signed in as {} ({}).", user.username, user.role),
        Err(err) => {
            warn!(error = %err, "profile lookup failed after sign-in");
            println!("Signed in as {}.", args.username.trim());
        }
    }
    println!("Continue in the {}.", args.landing);

    Ok(())
}

/// # Errors
/// Returns an error if the session file cannot be removed.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    globals.session_store().clear()?;
    println!("Signed out.");
    Ok(())
}

/// # Errors
/// Returns an error if the photo cannot be read or registration is rejected.
pub async fn register(args: Register, globals: &GlobalArgs) -> Result<()> {
    let photo = match args.photo.as_deref() {
        Some(source) => Some(
            ImageBlob::load(source)
                .await
                .with_context(|| format!("failed to load photo {source}"))?,
        ),
        None => None,
    };

    let api = ApiClient::new(&globals.api_url, Session::new())?;
    let user = account::register(
        &api,
        RegisterForm {
            username: args.username,
            password: args.password,
            email: args.email,
            role: args.role,
            student_type: args.student_type,
            college_name: args.college_name,
            photo,
        },
    )
    .await?;

    println!("Registered {}. Sign in with `gatepass login`.", user.username);

    Ok(())
}

/// # Errors
/// Returns an error without a session or if the profile cannot be fetched.
pub async fn me(globals: &GlobalArgs) -> Result<()> {
    let api = globals.client()?;
    let user = account::me(&api).await?;

    println!("{}", user.username);
    println!("  email: {}", user.email);
    println!("  role:  {}", user.role);
    if let Some(student_type) = &user.student_type {
        println!("  type:  {student_type}");
    }
    if let Some(college) = &user.college_name {
        println!("  college: {college}");
    }
    if let Some(photo) = user.photo_url.as_deref().and_then(|p| api.media_url(p)) {
        println!("  photo: {photo}");
    }
    if user.is_suspended {
        println!("  SUSPENDED");
    }

    Ok(())
}

/// # Errors
/// Returns an error without a session or if the passes cannot be fetched.
pub async fn passes(globals: &GlobalArgs) -> Result<()> {
    let api = globals.client()?;
    let passes = account::passes(&api).await?;

    if passes.is_empty() {
        println!("No active passes.");
        return Ok(());
    }

    for pass in &passes {
        println!("{}  {}", pass.event_name(), pass.qr_code_data);
    }

    Ok(())
}
