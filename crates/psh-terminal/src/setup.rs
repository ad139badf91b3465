//! Default filesystem layout for a fresh session.

use psh_types::config::ShellConfig;
use psh_types::error::{PshError, Result};
use psh_vfs::Vfs;
use psh_vfs::path;

const README: &str = "Welcome to psh, a PowerShell-style shell over an in-memory filesystem.\n\
Type 'Get-Help' to list commands or 'Get-Help <command>' for details.\n\
Try: ls | Where-Object { $_.Length -gt 10 } | Sort-Object Name\n";

/// Create the standard directories and the welcome file. Items that already
/// exist are left alone.
pub fn seed_default_tree(vfs: &mut dyn Vfs, config: &ShellConfig) -> Result<()> {
    let root = config.drive_root();
    let home = config.home_dir();
    let dirs = [
        path::join(&root, "Users"),
        home.clone(),
        path::join(&home, "Documents"),
        path::join(&home, "Desktop"),
        path::join(&home, "Downloads"),
        path::join(&root, "Windows"),
        path::join(&root, "Windows\\System32"),
    ];
    for dir in &dirs {
        match vfs.make_dir(dir) {
            Ok(()) | Err(PshError::AlreadyExists(_)) => {},
            Err(e) => return Err(e),
        }
    }
    let readme = path::join(&home, "readme.txt");
    if !vfs.exists(&readme) {
        vfs.write_file(&readme, README, false)?;
    }
    log::debug!("Seeded default tree under {root}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use psh_types::clock::SystemClock;
    use psh_vfs::MemoryVfs;

    #[test]
    fn seeds_expected_layout() {
        let config = ShellConfig::default();
        let mut vfs = MemoryVfs::new(Arc::new(SystemClock), &config.drive_root());
        seed_default_tree(&mut vfs, &config).unwrap();
        for dir in [
            "C:\\",
            "C:\\Users",
            "C:\\Users\\user",
            "C:\\Users\\user\\Documents",
            "C:\\Users\\user\\Desktop",
            "C:\\Users\\user\\Downloads",
            "C:\\Windows\\System32",
        ] {
            assert!(vfs.is_dir(dir), "{dir} missing");
        }
        assert!(vfs.read_content("C:\\Users\\user\\readme.txt").contains("Get-Help"));
    }

    #[test]
    fn seeding_twice_keeps_edits() {
        let config = ShellConfig::default();
        let mut vfs = MemoryVfs::new(Arc::new(SystemClock), &config.drive_root());
        seed_default_tree(&mut vfs, &config).unwrap();
        vfs.write_file("C:\\Users\\user\\readme.txt", "mine", false).unwrap();
        seed_default_tree(&mut vfs, &config).unwrap();
        assert_eq!(vfs.read_content("C:\\Users\\user\\readme.txt"), "mine");
    }

    #[test]
    fn follows_configured_user_and_drive() {
        let config = ShellConfig {
            user_name: "ada".into(),
            drive: "D:".into(),
            ..ShellConfig::default()
        };
        let mut vfs = MemoryVfs::new(Arc::new(SystemClock), &config.drive_root());
        seed_default_tree(&mut vfs, &config).unwrap();
        assert!(vfs.is_dir("D:\\Users\\ada\\Desktop"));
    }
}
