mod logging;
mod requests;
mod server;
mod session;

use std::sync::Arc;

use anyhow::Result;
use stratum_workspace::LanguageServiceFactory;
use tower_lsp_server::LspService;
use tower_lsp_server::Server;
use tracing::info;

pub use crate::requests::MatchConfigParams;
pub use crate::requests::MatchConfigResult;
pub use crate::requests::ProjectFilesParams;
pub use crate::requests::ProjectInfo;
pub use crate::requests::ProjectsParams;
pub use crate::requests::VirtualFileContent;
pub use crate::requests::VirtualFileNode;
pub use crate::requests::VirtualFileParams;
pub use crate::requests::VirtualFilesParams;
pub use crate::requests::WriteVirtualFilesParams;
pub use crate::server::StratumLanguageServer;

/// Run the language server over stdio until the client disconnects.
pub async fn serve(factory: Arc<dyn LanguageServiceFactory>) -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(move |client| {
        let log_client = client.clone();
        let guard = logging::init_tracing(move |message_type, message| {
            // Forwarding happens from arbitrary logging call sites; only
            // spawn when a runtime is actually driving us.
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let client = log_client.clone();
                handle.spawn(async move {
                    client.log_message(message_type, message).await;
                });
            }
        });
        StratumLanguageServer::new(client, factory, guard)
    })
    .custom_method("stratum/matchConfig", StratumLanguageServer::match_config)
    .custom_method("stratum/projects", StratumLanguageServer::projects)
    .custom_method("stratum/projectFiles", StratumLanguageServer::project_files)
    .custom_method("stratum/virtualFiles", StratumLanguageServer::virtual_files)
    .custom_method("stratum/virtualFile", StratumLanguageServer::virtual_file)
    .custom_method(
        "stratum/reloadProjects",
        StratumLanguageServer::reload_projects,
    )
    .custom_method(
        "stratum/writeVirtualFiles",
        StratumLanguageServer::write_virtual_files,
    )
    .finish();

    Server::new(stdin, stdout, socket).serve(service).await;
    info!("server loop finished");

    Ok(())
}
