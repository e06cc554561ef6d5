use std::io::Write;

use lapstore_core::{preset_gifts, ProductType};

use super::*;
use crate::gifts::format_gift;
use crate::products::read_import_file;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["lapstore-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["lapstore-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["lapstore-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn products_list_defaults() {
    let cli = Cli::try_parse_from(["lapstore-cli", "products", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Products {
            command: ProductsCommands::List {
                product_type: None,
                featured: false,
                limit: 50,
            }
        })
    ));
}

#[test]
fn products_list_with_filters() {
    let cli = Cli::try_parse_from([
        "lapstore-cli",
        "products",
        "list",
        "--type",
        "accessory",
        "--featured",
        "--limit",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Products {
            command: ProductsCommands::List {
                product_type: Some(ProductType::Accessory),
                featured: true,
                limit: 5,
            }
        })
    ));
}

#[test]
fn products_list_rejects_unknown_type() {
    let result =
        Cli::try_parse_from(["lapstore-cli", "products", "list", "--type", "tablet"]);
    assert!(result.is_err());
}

#[test]
fn products_delete_requires_uuid() {
    let id = uuid::Uuid::new_v4();
    let cli =
        Cli::try_parse_from(["lapstore-cli", "products", "delete", &id.to_string()]).unwrap();
    match cli.command {
        Some(Commands::Products {
            command: ProductsCommands::Delete { id: parsed },
        }) => assert_eq!(parsed, id),
        other => panic!("unexpected command: {other:?}"),
    }

    assert!(Cli::try_parse_from(["lapstore-cli", "products", "delete", "abc"]).is_err());
}

#[test]
fn products_import_dry_run() {
    let cli = Cli::try_parse_from([
        "lapstore-cli",
        "products",
        "import",
        "stock.json",
        "--dry-run",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Products {
            command: ProductsCommands::Import { path, dry_run },
        }) => {
            assert_eq!(path, std::path::PathBuf::from("stock.json"));
            assert!(dry_run);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_gifts_list() {
    let cli = Cli::try_parse_from(["lapstore-cli", "gifts", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Gifts {
            command: GiftsCommands::List
        })
    ));
}

#[test]
fn gift_rows_show_category_label() {
    let gifts = preset_gifts();
    let row = format_gift(&gifts[5]);
    assert!(row.starts_with("6 "));
    assert!(row.contains("Mouse Pad"));
    assert!(row.ends_with("Gaming Mouse Pad"));
}

#[test]
fn import_file_accepts_valid_products() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"name": "Dell Inspiron 15", "specs": "i5, 8GB, 512GB SSD", "price": "₹28,000",
              "type": "laptop", "image": "", "images": []}},
            {{"name": "Logitech M331", "specs": "Silent wireless mouse", "price": "₹1,200",
              "type": "accessory", "category": "mouse"}}
        ]"#
    )
    .unwrap();

    let payloads = read_import_file(file.path()).unwrap();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].product_type(), ProductType::Laptop);
    assert_eq!(payloads[1].category(), Some("mouse"));
}

#[test]
fn import_file_rejects_whole_file_on_invalid_entry() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"name": "Dell Inspiron 15", "specs": "i5", "price": "₹28,000", "type": "laptop"}},
            {{"name": "", "specs": "i7", "price": "₹40,000", "type": "laptop"}}
        ]"#
    )
    .unwrap();

    let err = read_import_file(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("entry 1"));
}

#[test]
fn import_file_rejects_non_array() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"name": "solo"}}"#).unwrap();

    assert!(read_import_file(file.path()).is_err());
}
