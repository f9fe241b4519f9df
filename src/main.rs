mod cli;

use std::fs;
use std::path::Path;

use cli::{Cli, Commands};
use soundcloud_api::config::Config;
use soundcloud_api::error::{AppError, Result};
use soundcloud_api::soundcloud::model::{Track, User};
use soundcloud_api::soundcloud::{ARTWORK_FIELD, ASSET_FIELD};
use soundcloud_api::util::{mime_for_path, prompt};
use soundcloud_api::{
    ApiResponse, BasicClient, Call, Credentials, HttpTransport, RequestBody, SoundcloudClient,
    Verb,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let mut config = Config::new()?;

    let Some(command) = &cli.command else {
        if cli.save_consumer {
            cli.resolve_consumer(&mut config)?;
            return Ok(());
        }
        tracing::error!("No command specified. Use --help to see available commands.");
        std::process::exit(1);
    };

    let transport = match cli.resolve_timeout(&config) {
        Some(timeout) => HttpTransport::with_timeout(timeout)?,
        None => HttpTransport::new()?,
    };

    match command {
        Commands::Authorize { callback } => {
            let mut client = oauth_client(&cli, &mut config, transport)?;
            let request_token = client.get_request_token(callback)?.ok_or_else(|| {
                AppError::Handshake("no request token in response".into())
            })?;

            println!(
                "Visit this URL to authorize the application:\n{}",
                client.get_authorize_url(&request_token)
            );
            let verifier = prompt("Verification code")?;

            let access_token = client
                .get_access_token(&verifier)?
                .ok_or_else(|| AppError::Handshake("no access token in response".into()))?;
            config.save_access_token(&access_token)?;
            tracing::info!("Stored access token in {}", config.path().display());
        }
        Commands::Me => {
            let client = authenticated_client(&cli, &mut config, transport)?;
            let resp = client.request("me", Verb::Get, RequestBody::Empty, &json_accept())?;
            let user: User = resp.json()?;
            println!(
                "{} ({}) id={} tracks={}",
                user.username,
                user.full_name.as_deref().unwrap_or(&user.permalink),
                user.id,
                user.track_count.unwrap_or_default()
            );
        }
        Commands::Request {
            path,
            method,
            params,
            headers,
            data_file,
        } => {
            let client = authenticated_client(&cli, &mut config, transport)?;
            let body = match data_file {
                Some(file) => RequestBody::Raw(fs::read(file)?),
                None if params.is_empty() => RequestBody::Empty,
                None => RequestBody::Params(params.clone()),
            };
            print_response(client.request(path, *method, body, headers)?);
        }
        Commands::Upload {
            asset,
            artwork,
            title,
            fields,
            asset_mime,
            artwork_mime,
        } => {
            let client = authenticated_client(&cli, &mut config, transport)?;

            let mut track_fields = vec![(ASSET_FIELD.to_string(), path_string(asset)?)];
            if let Some(artwork) = artwork {
                track_fields.push((ARTWORK_FIELD.to_string(), path_string(artwork)?));
            }
            if let Some(title) = title {
                track_fields.push(("track[title]".to_string(), title.clone()));
            }
            track_fields.extend(fields.iter().cloned());

            let asset_mime = asset_mime
                .as_deref()
                .unwrap_or_else(|| mime_for_path(asset));
            let artwork_mime = artwork_mime
                .as_deref()
                .or_else(|| artwork.as_deref().map(mime_for_path))
                .unwrap_or("image/jpeg");

            let resp = client.upload_track(&track_fields, asset_mime, artwork_mime)?;
            match resp.json::<Track>() {
                Ok(track) => tracing::info!(
                    "Uploaded track {} ({}) to: {}",
                    track.title,
                    track.id,
                    track.permalink_url
                ),
                Err(_) => print_response(resp),
            }
        }
        Commands::Basic {
            username,
            password,
            resource,
            method,
            args,
            query,
            verb,
            fields,
        } => {
            let mut client =
                BasicClient::with_transport(Credentials::new(username, password), transport);
            if let Some(base_url) = cli.basic_base_url() {
                client = client.with_base_url(base_url);
            }

            let mut call = match method {
                Some(method) => Call::new(method),
                None => Call::collection(),
            };
            for (key, value) in args {
                call = call.arg(key, value);
            }
            if !query.is_empty() {
                call = call.query(query.iter().cloned());
            }
            call = match verb {
                Verb::Get => call,
                Verb::Post => call.post(fields.iter().cloned()),
                Verb::Put => call.put(fields.iter().cloned()),
                Verb::Delete => call.delete().fields(fields.iter().cloned()),
            };

            print_response(client.resource(*resource).call(call)?);
        }
        Commands::ClearToken => {
            config.clear_access_token()?;
            tracing::info!("Cleared stored access token");
        }
    }

    Ok(())
}

fn oauth_client(
    cli: &Cli,
    config: &mut Config,
    transport: HttpTransport,
) -> Result<SoundcloudClient> {
    let consumer = cli.resolve_consumer(config)?;
    let mut client = SoundcloudClient::with_transport(consumer, transport);
    if let Some(base_url) = cli.resolve_base_url(config) {
        client = client.with_base_url(&base_url);
    }
    Ok(client)
}

fn authenticated_client(
    cli: &Cli,
    config: &mut Config,
    transport: HttpTransport,
) -> Result<SoundcloudClient> {
    let token = config.access_token().ok_or_else(|| {
        AppError::Configuration("No access token stored. Run `authorize` first".into())
    })?;
    Ok(oauth_client(cli, config, transport)?.with_token(token))
}

fn json_accept() -> Vec<(String, String)> {
    vec![("Accept".to_string(), "application/json".to_string())]
}

fn path_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidArgument(format!("non UTF-8 path: {}", path.display())))
}

fn print_response(resp: ApiResponse) {
    match resp {
        ApiResponse::Empty => tracing::info!("Request succeeded with an empty response"),
        ApiResponse::Body(body) => println!("{}", body),
    }
}
