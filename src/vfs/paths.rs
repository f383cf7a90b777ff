//! Inode-to-path bookkeeping for the inode-addressed FUSE protocol.
//!
//! The table assigns stable inode numbers to paths the kernel has seen. It
//! holds no attributes and no data.

use std::collections::HashMap;

/// Inode number of the filesystem root.
pub const ROOT_INO: u64 = 1;

#[derive(Debug)]
pub struct PathTable {
    by_ino: HashMap<u64, String>,
    by_path: HashMap<String, u64>,
    next_ino: u64,
}

impl Default for PathTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTable {
    pub fn new() -> Self {
        let mut by_ino = HashMap::new();
        let mut by_path = HashMap::new();
        by_ino.insert(ROOT_INO, "/".to_string());
        by_path.insert("/".to_string(), ROOT_INO);
        Self {
            by_ino,
            by_path,
            next_ino: ROOT_INO + 1,
        }
    }

    /// Inode for `path`, assigning a fresh one on first sight.
    pub fn assign(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.by_path.get(path) {
            return ino;
        }
        let ino = self.next_ino;
        self.next_ino += 1;
        self.by_ino.insert(ino, path.to_string());
        self.by_path.insert(path.to_string(), ino);
        ino
    }

    pub fn path_of(&self, ino: u64) -> Option<String> {
        self.by_ino.get(&ino).cloned()
    }

    /// Drop the mapping for `path` after unlink/rmdir.
    pub fn remove(&mut self, path: &str) {
        if let Some(ino) = self.by_path.remove(path) {
            self.by_ino.remove(&ino);
        }
    }

    /// Move `old` (and every path under it) to `new`, keeping inode numbers
    /// stable.
    pub fn rename(&mut self, old: &str, new: &str) {
        let prefix = format!("{old}/");
        let moved: Vec<(String, u64)> = self
            .by_path
            .iter()
            .filter(|(p, _)| p.as_str() == old || p.starts_with(&prefix))
            .map(|(p, &ino)| (p.clone(), ino))
            .collect();
        for (path, ino) in moved {
            let renamed = format!("{new}{}", &path[old.len()..]);
            self.by_path.remove(&path);
            self.by_path.insert(renamed.clone(), ino);
            self.by_ino.insert(ino, renamed);
        }
    }
}

/// Join a directory path and a child name.
pub fn join_child(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}
