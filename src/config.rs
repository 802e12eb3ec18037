//! Defines [`Config`], the set of input and output paths for a build. Every
//! path is derived from the project root; nothing is read from disk or the
//! environment.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The project root. Everything below is relative to it.
    pub root_directory: PathBuf,

    /// Where the Markdown posts live (`content/posts`).
    pub posts_source_directory: PathBuf,

    /// Where post pages are written (`articles`).
    pub articles_output_directory: PathBuf,

    /// The home page whose "latest articles" grid gets patched.
    pub home_page: PathBuf,

    /// The articles index page whose article list gets patched.
    pub articles_index: PathBuf,
}

impl Config {
    pub fn from_root(root: &Path) -> Config {
        let articles_output_directory = root.join("articles");
        Config {
            root_directory: root.to_owned(),
            posts_source_directory: root.join("content").join("posts"),
            articles_index: articles_output_directory.join("index.html"),
            articles_output_directory,
            home_page: root.join("index.html"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_root() {
        let config = Config::from_root(Path::new("/srv/blog"));
        assert_eq!(
            Config {
                root_directory: PathBuf::from("/srv/blog"),
                posts_source_directory: PathBuf::from("/srv/blog/content/posts"),
                articles_output_directory: PathBuf::from("/srv/blog/articles"),
                home_page: PathBuf::from("/srv/blog/index.html"),
                articles_index: PathBuf::from("/srv/blog/articles/index.html"),
            },
            config
        );
    }
}
