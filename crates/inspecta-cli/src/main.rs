use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use inspecta_cli::api_client::{
    ApiClient, DirectUploader, PictureOwnerFilter, PicturePageRequest, UploadFile, UploadFlow,
    UploadRequest, UploadType,
};
use inspecta_cli::{init_tracing, outcome_row, picture_row};

#[derive(Parser, Debug)]
#[command(name = "inspecta")]
#[command(about = "Upload and browse inspection pictures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload files directly to the object store and register them
    Upload(UploadArgs),
    /// List pictures in gallery order
    Pictures(PicturesArgs),
}

#[derive(Parser, Debug)]
struct UploadArgs {
    #[arg(long)]
    inspection_id: i64,

    #[arg(long)]
    sub_item_id: i64,

    #[arg(long, value_enum, default_value = "inspection")]
    kind: PictureKind,

    /// Limit parallel uploads (default: all at once)
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Registration attempts on a concurrent modification
    #[arg(long, default_value = "3")]
    attempts: usize,

    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct PicturesArgs {
    #[arg(long)]
    inspection_id: Option<i64>,

    #[arg(long)]
    checklist_item_id: Option<i64>,

    /// Page size (clamped by the server)
    #[arg(long, default_value = "20")]
    page_size: i64,

    /// Follow cursors until the last page
    #[arg(long)]
    all: bool,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PictureKind {
    Inspection,
    Checklist,
}

impl From<PictureKind> for UploadType {
    fn from(kind: PictureKind) -> Self {
        match kind {
            PictureKind::Inspection => UploadType::InspectionPicture,
            PictureKind::Checklist => UploadType::ChecklistPicture,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let client = ApiClient::from_env()?;

    match cli.command {
        Command::Upload(args) => upload(client, args).await,
        Command::Pictures(args) => pictures(client, args).await,
    }
}

async fn upload(client: ApiClient, args: UploadArgs) -> Result<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("File path has no usable file name")?;
        files.push(UploadFile::new(file_name, content));
    }

    let uploader =
        DirectUploader::new(client.client().clone()).with_max_concurrency(args.max_concurrency);
    let mut flow =
        UploadFlow::new(client, uploader).with_max_registration_attempts(args.attempts);

    let report = flow
        .run(UploadRequest {
            inspection_id: args.inspection_id,
            checklist_sub_item_id: args.sub_item_id,
            upload_type: args.kind.into(),
            files,
        })
        .await?;

    for outcome in &report.outcomes {
        println!("{}", outcome_row(outcome));
    }
    println!(
        "\nRegistered {} of {} file(s): {:?}",
        report.registered_ids.len(),
        report.outcomes.len(),
        report.registered_ids
    );

    Ok(())
}

async fn pictures(client: ApiClient, args: PicturesArgs) -> Result<()> {
    let owner_filter = PictureOwnerFilter {
        inspection_id: args.inspection_id,
        checklist_item_id: args.checklist_item_id,
    };
    let mut request = PicturePageRequest {
        cursor: None,
        owner_filter: Some(owner_filter),
        page_size: Some(args.page_size),
    };

    let mut pictures = Vec::new();
    loop {
        let page = client.page_pictures(&request).await?;
        pictures.extend(page.content);

        match page.next_cursor {
            Some(cursor) if args.all && page.has_next => request.cursor = Some(cursor),
            _ => break,
        }
    }

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&pictures)?),
        _ => {
            println!(
                "{:<10} {:>11} {:>5}  {:<32} KEY",
                "ID", "POSITION", "SEQ", "NAME"
            );
            for picture in &pictures {
                println!("{}", picture_row(picture));
            }
            println!("\n{} picture(s)", pictures.len());
        }
    }

    Ok(())
}
