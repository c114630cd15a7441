//! Handlers for the store subcommands.

use async_trait::async_trait;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::domain::{OwnerId, Store, StoreId};
use crate::error::Result;
use crate::infrastructure::bootstrap::App;
use crate::port::inbound::relay::{
    RelayMessage, RelaySink, PROVISIONING_COMPLETE, PROVISIONING_FAILED,
};

#[derive(Tabled)]
struct StoreRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&Store> for StoreRow {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id().to_string(),
            name: store.name().to_string(),
            status: store.status().as_str(),
            owner: store.owner().to_string(),
            created: store.created_at().format("%Y-%m-%d %H:%M").to_string(),
            url: store.endpoint_url().unwrap_or("-").to_string(),
        }
    }
}

fn store_json(store: &Store) -> serde_json::Value {
    json!({
        "id": store.id().as_str(),
        "name": store.name().as_str(),
        "status": store.status().as_str(),
        "owner": store.owner().as_str(),
        "created_at": store.created_at().to_rfc3339(),
        "url": store.endpoint_url(),
    })
}

/// Execute the create command.
pub async fn create(app: &App, name: &str, owner: &str) -> Result<()> {
    let store = app.stores.create(name, OwnerId::new(owner)).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "create", "store": store_json(&store) }));
        return Ok(());
    }

    output::success(&format!("Created store {}", output::highlight(store.name())));
    output::field("Id", store.id());
    output::field("Status", output::status(store.status()));
    output::hint(&format!(
        "run {} to deploy it",
        output::highlight(format!("storeforge provision {}", store.id()))
    ));
    Ok(())
}

/// Execute the list command.
pub async fn list(app: &App, owner: Option<&str>) -> Result<()> {
    let owner = owner.map(OwnerId::new);
    let stores = app.stores.list(owner.as_ref()).await?;

    if output::is_json() {
        let stores: Vec<_> = stores.iter().map(store_json).collect();
        output::json_output(json!({ "command": "list", "stores": stores }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    if stores.is_empty() {
        output::lines("No stores yet.");
        output::hint(&format!(
            "run {} to register one",
            output::highlight("storeforge create <name>")
        ));
        return Ok(());
    }

    let rows: Vec<StoreRow> = stores.iter().map(StoreRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    output::lines(&table.to_string());
    Ok(())
}

/// Execute the show command.
pub async fn show(app: &App, id: &str) -> Result<()> {
    let store = app.stores.get(&StoreId::parse(id)?).await?;

    if output::is_json() {
        let mut value = store_json(&store);
        if let Some(details) = store.connection_details() {
            value["connection"] = serde_json::to_value(details)?;
        }
        output::json_output(json!({ "command": "show", "store": value }));
        return Ok(());
    }

    output::section(store.name().as_str());
    output::field("Id", store.id());
    output::field("Status", output::status(store.status()));
    output::field("Owner", store.owner());
    output::field("Created", store.created_at().to_rfc3339());
    if let Some(admin) = store.admin_principal() {
        output::field("URL", store.endpoint_url().unwrap_or_default());
        output::field("Admin user", &admin.username);
        output::field("Password", &admin.password);
    }
    Ok(())
}

/// Execute the retry command.
pub async fn retry(app: &App, id: &str) -> Result<()> {
    let store = app.stores.retry(&StoreId::parse(id)?).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "retry", "store": store_json(&store) }));
        return Ok(());
    }

    output::success(&format!(
        "Store {} is back in {}",
        output::highlight(store.name()),
        output::status(store.status())
    ));
    Ok(())
}

/// Execute the delete command.
pub async fn delete(app: &App, id: &str) -> Result<()> {
    let store = app.stores.delete(&StoreId::parse(id)?).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "delete", "id": store.id().as_str() }));
        return Ok(());
    }

    output::success(&format!("Deleted store {}", output::highlight(store.name())));
    Ok(())
}

/// Execute the provision command. Returns whether the store ended up READY.
pub async fn provision(app: &App, id: &str) -> Result<bool> {
    let id = StoreId::parse(id)?;
    output::header(env!("CARGO_PKG_VERSION"));

    let mut sink = TerminalSink::default();
    app.relay.relay(&id, &mut sink).await?;
    Ok(sink.succeeded)
}

/// Renders relay messages on the terminal.
#[derive(Debug, Default)]
struct TerminalSink {
    succeeded: bool,
}

#[async_trait]
impl RelaySink for TerminalSink {
    async fn send(&mut self, message: RelayMessage) -> Result<()> {
        match message {
            RelayMessage::Line(line) => output::log_line(&line),
            RelayMessage::Complete(details) => {
                self.succeeded = true;
                if output::is_json() {
                    output::json_output(json!({
                        "type": PROVISIONING_COMPLETE,
                        "payload": details,
                    }));
                } else {
                    output::success("Store is ready");
                    output::field("URL", &details.url);
                    output::field("Admin user", &details.admin_user);
                    output::field("Password", &details.admin_password);
                }
            }
            RelayMessage::Failed => {
                if output::is_json() {
                    output::json_output(json!({ "type": PROVISIONING_FAILED }));
                } else {
                    output::error("Provisioning failed");
                }
            }
            RelayMessage::NotFound => output::error("Store not found"),
        }
        Ok(())
    }
}
