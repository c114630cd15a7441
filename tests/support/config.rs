use std::fs;
use std::path::{Path, PathBuf};

/// Config that runs `true` in place of `helm` and `kubectl`, so every
/// deployment step succeeds without a cluster.
pub fn succeeding_tools(database: &Path) -> String {
    tools_config("true", database)
}

/// Config whose deployment tool always exits 1.
pub fn failing_tools(database: &Path) -> String {
    tools_config("false", database)
}

fn tools_config(binary: &str, database: &Path) -> String {
    format!(
        concat!(
            "database = \"{database}\"\n",
            "\n",
            "[deploy]\n",
            "helm_bin = \"{binary}\"\n",
            "kubectl_bin = \"{binary}\"\n",
            "\n",
            "[logging]\n",
            "level = \"warn\"\n",
            "format = \"pretty\"\n",
        ),
        database = database.display(),
        binary = binary,
    )
}

pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}
