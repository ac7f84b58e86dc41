//! Require graph inspection

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::output::Output;
use crate::domain::InclusionResolver;

pub fn run(cwd: &Path, test: bool, entry: Option<PathBuf>, output: &Output) -> Result<()> {
    let resolver = if test {
        InclusionResolver::for_tests(cwd)
    } else {
        InclusionResolver::for_sources(cwd)
    };

    let entry = match entry {
        Some(entry) => cwd.join(entry),
        None if test => cwd.join("test").join("test.js"),
        None => cwd.join("src").join("javascript").join("main.js"),
    };

    output.verbose_ctx(
        "deps",
        &format!(
            "Resolving {} against {:?}",
            entry.display(),
            resolver.search_roots()
        ),
    );

    let resolution = resolver.resolve(&entry)?;
    let relative = |path: &Path| path.strip_prefix(cwd).unwrap_or(path).display().to_string();

    let files: Vec<String> = resolution.files().iter().map(|p| relative(p.as_path())).collect();
    let edges: Vec<(String, String)> = resolution
        .edges()
        .into_iter()
        .map(|(from, to)| (relative(from), relative(to)))
        .collect();
    let cycle = resolution.has_cycle();

    if output.is_json() {
        output.data(&serde_json::json!({
            "entry": relative(entry.as_path()),
            "files": files,
            "edges": edges
                .iter()
                .map(|(from, to)| serde_json::json!({"from": from, "to": to}))
                .collect::<Vec<_>>(),
            "cycle": cycle,
            "lines": resolution.lines().len(),
        }));
        return Ok(());
    }

    println!("Files (in inclusion order):");
    for (index, file) in files.iter().enumerate() {
        println!("  {:>3}. {}", index + 1, file);
    }

    if !edges.is_empty() {
        println!();
        println!("Requires:");
        for (from, to) in &edges {
            println!("  {} -> {}", from, to);
        }
    }

    if cycle {
        println!();
        println!("Warning: the require graph contains a cycle; repeated files were skipped.");
    }

    Ok(())
}
