mod build;
mod deploy;

pub use build::{BuildOptions, build};
pub use deploy::{GenerateOptions, deploy_generate};

/// Print `text` framed by rules, under a `|| title:` banner.
pub(crate) fn dump_text_with_title(text: &str, title: &str) {
    let rule = "=".repeat(79);
    println!("{rule}\n|| {title}:\n{rule}\n{text}\n{rule}");
}
