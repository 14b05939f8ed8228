// src/bin/feed.rs
//
// Terminal feed over the posts API.
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::error;

use postboard_be::feed::client::{FeedClient, ImageAttachment, PostDraft};
use postboard_be::feed::render::{render_feed, render_notice, render_post};
use postboard_be::feed::store::FeedUser;
use postboard_be::feed::Feed;
use postboard_be::services::image_storage::content_type_for;

#[derive(Parser)]
#[command(name = "feed")]
#[command(about = "Read and share posts from the terminal")]
#[command(version)]
struct Cli {
    #[arg(long, env = "FEED_API_URL", default_value = "http://localhost:8080", help = "Base URL of the posts API")]
    api_url: String,

    #[arg(long, env = "FEED_TOKEN", hide_env_values = true, help = "Bearer token for authenticated calls")]
    token: Option<String>,

    #[arg(long, env = "FEED_USER", help = "Name the feed is shown to (needs a token)")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    #[command(about = "Print only your posts")]
    Mine,

    #[command(about = "Share a post, optionally with an image")]
    Post {
        #[arg(help = "Post title")]
        title: String,
        #[arg(help = "Post text")]
        content: String,
        #[arg(help = "Path to an image to attach")]
        image: Option<PathBuf>,
    },
}

async fn load_image(path: &Path) -> std::io::Result<ImageAttachment> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let content_type = content_type_for(&file_name.to_ascii_lowercase()).to_string();
    Ok(ImageAttachment { file_name, content_type, bytes })
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let user = cli
        .user
        .filter(|_| cli.token.is_some())
        .map(|name| FeedUser { id: name.clone(), username: name });

    let client = match FeedClient::new(&cli.api_url, cli.token) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to build http client: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        None => {
            let mut feed = Feed::new(client);
            feed.set_user(user).await;
            let store = feed.store();
            print!("{}", render_feed(&store.state(), store.user(), chrono::Utc::now()));
        }
        Some(Commands::Mine) => match client.my_posts().await {
            Ok(posts) => {
                let now = chrono::Utc::now();
                let mut out = String::new();
                for post in &posts {
                    render_post(post, now, &mut out);
                    out.push('\n');
                }
                print!("{}", out);
            }
            Err(e) => {
                eprintln!("{}", e.user_message("Unable to load your posts right now."));
                std::process::exit(1);
            }
        },
        Some(Commands::Post { title, content, image }) => {
            let image = match image {
                Some(path) => match load_image(&path).await {
                    Ok(img) => Some(img),
                    Err(e) => {
                        eprintln!("cannot read {}: {}", path.display(), e);
                        std::process::exit(1);
                    }
                },
                None => None,
            };

            let mut feed = Feed::new(client);
            feed.set_user(user).await;
            let result = feed.submit(&PostDraft::new(title, content), image).await;
            for notice in feed.store_mut().drain_notices() {
                println!("{}", render_notice(&notice));
            }
            if result.is_err() {
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_prints_the_feed() {
        let cli = Cli::try_parse_from(["feed"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn post_takes_title_content_and_optional_image() {
        let cli = Cli::try_parse_from(["feed", "post", "Hello", "World", "cat.png"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Post {
                title: "Hello".into(),
                content: "World".into(),
                image: Some(PathBuf::from("cat.png")),
            })
        );
    }

    #[test]
    fn post_without_content_is_a_usage_error() {
        let err = Cli::try_parse_from(["feed", "post", "Hello"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn help_is_available() {
        let err = Cli::try_parse_from(["feed", "--help"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::try_parse_from(["feed", "--api-url", "http://api.test", "mine"]).unwrap();
        assert_eq!(cli.api_url, "http://api.test");
        assert_eq!(cli.command, Some(Commands::Mine));
    }
}
