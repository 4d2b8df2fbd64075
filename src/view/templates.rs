use std::path::Path;
use std::{fs, io};

use spdlog::info;

/// Sources of every page shell and fragment. Built in, each file can be
/// replaced by one with the same name in the configured template directory.
#[derive(Clone)]
pub struct Templates {
    pub index: String,
    pub create: String,
    pub detail: String,
    pub not_found: String,
    pub nav: String,
    pub post_list: String,
    pub post_view: String,
    pub post_form: String,
}

const BUILTIN: [(&str, &str); 8] = [
    ("index.tpl", include_str!("../../res/template/index.tpl")),
    ("create.tpl", include_str!("../../res/template/create.tpl")),
    ("blog.tpl", include_str!("../../res/template/blog.tpl")),
    ("404.tpl", include_str!("../../res/template/404.tpl")),
    ("nav.tpl", include_str!("../../res/template/nav.tpl")),
    ("postlist.tpl", include_str!("../../res/template/postlist.tpl")),
    ("view.tpl", include_str!("../../res/template/view.tpl")),
    ("form.tpl", include_str!("../../res/template/form.tpl")),
];

fn read_template(tpl_dir: Option<&Path>, file_name: &str, builtin: &str) -> io::Result<String> {
    if let Some(tpl_dir) = tpl_dir {
        let full_path = tpl_dir.join(file_name);
        if full_path.exists() {
            info!("Using template {}", full_path.display());
            return fs::read_to_string(full_path);
        }
    }
    Ok(builtin.to_string())
}

impl Templates {
    pub fn builtin() -> Templates {
        Self::from_sources(BUILTIN.iter().map(|(_, builtin)| builtin.to_string()))
    }

    pub fn load(tpl_dir: Option<&Path>) -> io::Result<Templates> {
        let sources = BUILTIN.iter()
            .map(|(file_name, builtin)| read_template(tpl_dir, file_name, builtin))
            .collect::<io::Result<Vec<String>>>()?;
        Ok(Self::from_sources(sources.into_iter()))
    }

    // Same order as BUILTIN
    fn from_sources(mut sources: impl Iterator<Item=String>) -> Templates {
        let mut next = || sources.next().unwrap_or_default();
        Templates {
            index: next(),
            create: next(),
            detail: next(),
            not_found: next(),
            nav: next(),
            post_list: next(),
            post_view: next(),
            post_form: next(),
        }
    }
}
