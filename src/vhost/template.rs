//! nginx server block rendering

use std::path::Path;

/// Index files tried in order when a directory is requested
pub const INDEX_FILES: &[&str] = &["index.html", "index.htm", "index.nginx-debian.html"];

pub const LISTEN_PORT: u16 = 80;

/// Render a server block serving `root` for `server_name`.
pub fn render(root: &Path, server_name: &str) -> String {
    format!(
        "server {{\n\
         \x20   listen {port};\n\
         \x20   listen [::]:{port};\n\
         \n\
         \x20   root {root};\n\
         \x20   index {index};\n\
         \n\
         \x20   server_name {server_name};\n\
         \n\
         \x20   location / {{\n\
         \x20       try_files $uri $uri/ =404;\n\
         \x20   }}\n\
         }}\n",
        port = LISTEN_PORT,
        root = root.display(),
        index = INDEX_FILES.join(" "),
    )
}
