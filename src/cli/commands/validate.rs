use crate::changeset::Manifest;
use crate::cli::output::Output;
use crate::errors::Result;
use std::path::Path;

pub fn run(manifest_path: &Path) -> Result<()> {
    let manifest = Manifest::load_from_file(manifest_path)?;

    Output::success(format!(
        "{} is valid: {} change-sets",
        manifest_path.display(),
        manifest.len()
    ));
    for change_set in manifest.change_sets() {
        let specs: Vec<String> = change_set.path_specs.iter().map(|s| s.to_string()).collect();
        Output::bullet(format!(
            "{} → {} [{}]",
            change_set.name,
            change_set.branch_name,
            specs.join(", ")
        ));
    }
    if !manifest.has_catch_all() {
        Output::tip("No catch-all ('.') entry: pending paths outside every group stay uncommitted");
    }
    Ok(())
}
