use std::error::Error;
use std::{ fs, path::Path, path::PathBuf };
use serde_json::{ Value, Map };
use anyhow::Result;

const SUPPORTED_LOCALES: [&str; 2] = ["es", "en"];

fn main() -> Result<(), Box<dyn Error>> {
    let messages_dir = find_messages_directory()?;
    let out_path = Path::new(&std::env::var("OUT_DIR")?).join("all_translations.json");

    // Always create the file, even if empty, so include_str! works
    if !messages_dir.exists() {
        println!("cargo:warning=No messages/ folder found, bundling an empty translation tree");
        fs::write(out_path, "{}")?;
        return Ok(());
    }

    let translations = build_translations(&messages_dir)?;
    fs::write(out_path, serde_json::to_string(&translations)?)?;

    println!("cargo:rerun-if-changed={}", messages_dir.display());
    Ok(())
}

/// Collects `messages/<locale>/<namespace>.json` into `{ locale: { namespace: tree } }`.
fn build_translations(messages_dir: &Path) -> Result<Value> {
    let mut translations = Map::new();

    for lang_entry in fs::read_dir(messages_dir)? {
        let lang_dir = lang_entry?;
        if !lang_dir.file_type()?.is_dir() {
            continue;
        }

        let lang_code = lang_dir.file_name().to_string_lossy().to_string();
        if !SUPPORTED_LOCALES.contains(&lang_code.as_str()) {
            println!("cargo:warning=Skipping unsupported locale folder '{}'", lang_code);
            continue;
        }

        let mut namespaces = Map::new();
        for file_entry in fs::read_dir(lang_dir.path())? {
            let file_path = file_entry?.path();

            if let Some("json") = file_path.extension().and_then(|e| e.to_str()) {
                let namespace = file_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file_path.display()))?;

                let content = fs::read_to_string(&file_path)?;
                let json: Value = serde_json
                    ::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("{}: {}", file_path.display(), e))?;
                namespaces.insert(namespace.to_string(), json);
            }
        }
        translations.insert(lang_code, Value::Object(namespaces));
    }

    Ok(Value::Object(translations))
}

fn find_messages_directory() -> Result<PathBuf> {
    // The crate's own messages/ folder wins
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let messages_path = Path::new(&manifest_dir).join("messages");
        if messages_path.exists() {
            return Ok(messages_path);
        }
    }

    // Then walk up from the build output towards the workspace root
    if let Ok(out_dir) = std::env::var("OUT_DIR") {
        let mut current = PathBuf::from(&out_dir);
        loop {
            let messages_path = current.join("messages");
            if messages_path.exists() {
                return Ok(messages_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    // Fallback to messages in current directory (even if it doesn't exist)
    Ok(Path::new("messages").to_path_buf())
}
