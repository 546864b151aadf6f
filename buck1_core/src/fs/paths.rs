/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! Paths relative to the project root. A 'ProjectRelativePath' is a
//! normalized, platform-agnostic, forward-only path: no leading `/`, no `.`
//! or `..` components, `/` separators. The empty path refers to the project
//! root itself.

use std::borrow::Borrow;
use std::ops::Deref;
use std::path::Path;
use std::path::PathBuf;

use derive_more::Display;
use ref_cast::RefCast;
use thiserror::Error;

#[derive(Error, Debug)]
enum ProjectRelativePathError {
    #[error("expected a relative path but got an absolute path instead: `{0}`")]
    PathNotRelative(String),
    #[error("expected a normalized path but got an un-normalized path instead: `{0}`")]
    PathNotNormalized(String),
}

/// A borrowed path relative to the project root.
#[derive(Display, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, RefCast)]
#[repr(transparent)]
pub struct ProjectRelativePath(str);

/// The owned version of 'ProjectRelativePath'.
#[derive(Clone, Display, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProjectRelativePathBuf(String);

impl ProjectRelativePath {
    pub fn unchecked_new<S: ?Sized + AsRef<str>>(s: &S) -> &Self {
        ProjectRelativePath::ref_cast(s.as_ref())
    }

    /// Creates a 'ProjectRelativePath' if the given string represents a
    /// forward, normalized relative path, otherwise error.
    ///
    /// ```
    /// use buck1_core::fs::paths::ProjectRelativePath;
    ///
    /// assert!(ProjectRelativePath::new("foo/bar").is_ok());
    /// assert!(ProjectRelativePath::new("").is_ok());
    /// assert!(ProjectRelativePath::new("/abs/bar").is_err());
    /// assert!(ProjectRelativePath::new("normalize/./bar").is_err());
    /// assert!(ProjectRelativePath::new("normalize/../bar").is_err());
    /// ```
    pub fn new<S: ?Sized + AsRef<str>>(s: &S) -> anyhow::Result<&ProjectRelativePath> {
        let s = s.as_ref();
        if s.starts_with('/') {
            return Err(ProjectRelativePathError::PathNotRelative(s.to_owned()).into());
        }
        if !s.is_empty() {
            for component in s.split('/') {
                match component {
                    "" | "." | ".." => {
                        return Err(
                            ProjectRelativePathError::PathNotNormalized(s.to_owned()).into()
                        );
                    }
                    c if c.contains('\\') => {
                        return Err(
                            ProjectRelativePathError::PathNotNormalized(s.to_owned()).into()
                        );
                    }
                    _ => {}
                }
            }
        }
        Ok(ProjectRelativePath::unchecked_new(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Creates an owned 'ProjectRelativePathBuf' with `path` adjoined to self.
    ///
    /// ```
    /// use buck1_core::fs::paths::{ProjectRelativePath, ProjectRelativePathBuf};
    ///
    /// let path = ProjectRelativePath::new("foo/bar")?;
    /// assert_eq!(
    ///     ProjectRelativePathBuf::unchecked_new("foo/bar/baz".into()),
    ///     path.join(ProjectRelativePath::new("baz")?)
    /// );
    /// assert_eq!(
    ///     ProjectRelativePathBuf::unchecked_new("baz".into()),
    ///     ProjectRelativePath::new("")?.join(ProjectRelativePath::new("baz")?)
    /// );
    ///
    /// # anyhow::Ok(())
    /// ```
    pub fn join<P: AsRef<ProjectRelativePath>>(&self, path: P) -> ProjectRelativePathBuf {
        let path = path.as_ref();
        if self.0.is_empty() {
            path.to_buf()
        } else if path.is_empty() {
            self.to_buf()
        } else {
            ProjectRelativePathBuf(format!("{}/{}", &self.0, path.as_str()))
        }
    }

    /// Returns the path of the parent directory, if there is one.
    pub fn parent(&self) -> Option<&ProjectRelativePath> {
        if self.0.is_empty() {
            return None;
        }
        match self.0.rfind('/') {
            Some(i) => Some(ProjectRelativePath::unchecked_new(&self.0[..i])),
            None => Some(ProjectRelativePath::unchecked_new("")),
        }
    }

    /// Returns the final component of the path, if there is one.
    pub fn file_name(&self) -> Option<&str> {
        if self.0.is_empty() {
            return None;
        }
        match self.0.rfind('/') {
            Some(i) => Some(&self.0[i + 1..]),
            None => Some(&self.0),
        }
    }

    /// Determines whether `base` is a prefix of `self`, considering whole
    /// path components only.
    ///
    /// ```
    /// use buck1_core::fs::paths::ProjectRelativePath;
    ///
    /// let path = ProjectRelativePath::new("some/foo")?;
    /// assert!(path.starts_with(ProjectRelativePath::new("some")?));
    /// assert!(path.starts_with(ProjectRelativePath::new("")?));
    /// assert!(!path.starts_with(ProjectRelativePath::new("som")?));
    ///
    /// # anyhow::Ok(())
    /// ```
    pub fn starts_with<P: AsRef<ProjectRelativePath>>(&self, base: P) -> bool {
        let base = base.as_ref();
        base.is_empty()
            || self.0 == base.0
            || (self.0.starts_with(&base.0) && self.0.as_bytes()[base.0.len()] == b'/')
    }

    /// Iterator over the components of this path. The empty path has no
    /// components.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }

    pub fn to_buf(&self) -> ProjectRelativePathBuf {
        self.to_owned()
    }
}

impl ProjectRelativePathBuf {
    pub fn unchecked_new(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ProjectRelativePathBuf {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<ProjectRelativePathBuf> {
        ProjectRelativePath::new(s.as_str())?;
        Ok(ProjectRelativePathBuf(s))
    }
}

impl TryFrom<&Path> for ProjectRelativePathBuf {
    type Error = anyhow::Error;

    fn try_from(p: &Path) -> anyhow::Result<ProjectRelativePathBuf> {
        let s = p
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("path is not utf-8: `{}`", p.display()))?;
        Ok(ProjectRelativePath::new(s)?.to_buf())
    }
}

impl TryFrom<PathBuf> for ProjectRelativePathBuf {
    type Error = anyhow::Error;

    fn try_from(p: PathBuf) -> anyhow::Result<ProjectRelativePathBuf> {
        ProjectRelativePathBuf::try_from(p.as_path())
    }
}

impl ToOwned for ProjectRelativePath {
    type Owned = ProjectRelativePathBuf;

    fn to_owned(&self) -> ProjectRelativePathBuf {
        ProjectRelativePathBuf(self.0.to_owned())
    }
}

impl AsRef<ProjectRelativePath> for ProjectRelativePath {
    fn as_ref(&self) -> &ProjectRelativePath {
        self
    }
}

impl AsRef<ProjectRelativePath> for ProjectRelativePathBuf {
    fn as_ref(&self) -> &ProjectRelativePath {
        ProjectRelativePath::ref_cast(&self.0)
    }
}

impl Borrow<ProjectRelativePath> for ProjectRelativePathBuf {
    fn borrow(&self) -> &ProjectRelativePath {
        self.as_ref()
    }
}

impl Deref for ProjectRelativePathBuf {
    type Target = ProjectRelativePath;

    fn deref(&self) -> &ProjectRelativePath {
        ProjectRelativePath::ref_cast(&self.0)
    }
}

impl PartialEq<str> for ProjectRelativePath {
    fn eq(&self, other: &str) -> bool {
        &self.0 == other
    }
}

impl PartialEq<str> for ProjectRelativePathBuf {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::fs::paths::ProjectRelativePath;
    use crate::fs::paths::ProjectRelativePathBuf;

    #[test]
    fn test_validation() {
        assert!(ProjectRelativePath::new("foo/bar").is_ok());
        assert!(ProjectRelativePath::new("").is_ok());
        assert!(ProjectRelativePath::new("/abs").is_err());
        assert!(ProjectRelativePath::new("foo//bar").is_err());
        assert!(ProjectRelativePath::new("foo/").is_err());
        assert!(ProjectRelativePath::new("foo/./bar").is_err());
        assert!(ProjectRelativePath::new("foo/../bar").is_err());
        assert!(ProjectRelativePath::new("foo\\bar").is_err());
    }

    #[test]
    fn test_parent_and_file_name() -> anyhow::Result<()> {
        let p = ProjectRelativePath::new("java/com/acme/BUCK")?;
        assert_eq!(Some(ProjectRelativePath::new("java/com/acme")?), p.parent());
        assert_eq!(Some("BUCK"), p.file_name());

        let top = ProjectRelativePath::new("BUCK")?;
        assert_eq!(Some(ProjectRelativePath::new("")?), top.parent());
        assert_eq!(None, ProjectRelativePath::new("")?.parent());
        Ok(())
    }

    #[test]
    fn test_iter() -> anyhow::Result<()> {
        let p = ProjectRelativePath::new("foo/bar/baz")?;
        assert_eq!(vec!["foo", "bar", "baz"], p.iter().collect::<Vec<_>>());
        assert_eq!(0, ProjectRelativePath::new("")?.iter().count());
        Ok(())
    }

    #[test]
    fn paths_work_in_maps() -> anyhow::Result<()> {
        let mut map = HashMap::new();
        let p1 = ProjectRelativePath::new("foo")?;
        let p2 = ProjectRelativePath::new("bar")?;
        map.insert(p1.to_buf(), p2.to_buf());
        assert_eq!(Some(p2), map.get(p1).map(|p| p.as_ref()));
        Ok(())
    }

    #[test]
    fn test_try_from() {
        assert!(ProjectRelativePathBuf::try_from("foo/bar".to_owned()).is_ok());
        assert!(ProjectRelativePathBuf::try_from("".to_owned()).is_ok());
        assert!(ProjectRelativePathBuf::try_from("/abs/bar".to_owned()).is_err());
    }
}
