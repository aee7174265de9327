//! Quick templates for new files.

use chrono::{DateTime, Local};
use std::fmt;

/// Built-in starting content for a new file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Empty,
    HelloWorld,
    Readme,
    PythonScript,
    HtmlPage,
    JsonConfig,
}

impl Template {
    pub const ALL: [Template; 6] = [
        Template::Empty,
        Template::HelloWorld,
        Template::Readme,
        Template::PythonScript,
        Template::HtmlPage,
        Template::JsonConfig,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Template::Empty => "Empty",
            Template::HelloWorld => "Hello World",
            Template::Readme => "README",
            Template::PythonScript => "Python Script",
            Template::HtmlPage => "HTML Page",
            Template::JsonConfig => "JSON Config",
        }
    }

    /// Short key used on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Template::Empty => "empty",
            Template::HelloWorld => "hello",
            Template::Readme => "readme",
            Template::PythonScript => "python",
            Template::HtmlPage => "html",
            Template::JsonConfig => "json",
        }
    }

    /// Look up by key or label, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(s) || t.label().eq_ignore_ascii_case(s))
    }

    /// Template body; only the JSON config embeds the time
    pub fn render(&self, now: DateTime<Local>) -> String {
        match self {
            Template::Empty => String::new(),
            Template::HelloWorld => {
                "Hello World!\nThis file was created by AI File Assistant.".to_string()
            }
            Template::Readme => "# Project Title\n\n## Description\nBrief description here.\n\n\
                                 ## Installation\n```bash\nnpm install\n```\n\n\
                                 ## Usage\nHow to use this project."
                .to_string(),
            Template::PythonScript => "#!/usr/bin/env python3\n# -*- coding: utf-8 -*-\n\"\"\"\n\
                                       Script created by AI File Assistant\n\"\"\"\n\n\
                                       def main():\n    print('Hello from AI Assistant!')\n\n\
                                       if __name__ == '__main__':\n    main()"
                .to_string(),
            Template::HtmlPage => "<!DOCTYPE html>\n<html lang='en'>\n<head>\n    \
                                   <meta charset='UTF-8'>\n    <title>AI Generated Page</title>\n\
                                   </head>\n<body>\n    <h1>Welcome!</h1>\n    \
                                   <p>This page was created by AI File Assistant.</p>\n\
                                   </body>\n</html>"
                .to_string(),
            Template::JsonConfig => format!(
                "{{\n  \"name\": \"ai-project\",\n  \"version\": \"1.0.0\",\n  \
                 \"description\": \"Created by AI Assistant\",\n  \
                 \"author\": \"AI File System\",\n  \"created\": \"{}\"\n}}",
                now.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Append `.ext` unless the name already ends with it
pub fn with_extension(name: &str, ext: &str) -> String {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() {
        return name.to_string();
    }
    let suffix = format!(".{}", ext);
    if name.to_lowercase().ends_with(&suffix.to_lowercase()) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}
