use authz_console_core::{FilterSpec, SortSpec};
use authz_console_view::DEFAULT_PAGE_SIZE;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "authz-console", about = "Administration console for the authorization backend")]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = "AUTHZ_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Exchange credentials for an access token.
    Signin(SigninArgs),
    /// List one page of a collection.
    List(ListArgs),
    /// Ask whether a principal may perform an action on a resource.
    Check(CheckArgs),
    /// Delete one entity after confirmation.
    Delete(DeleteArgs),
    /// Daily allowed/denied check counters.
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Actions,
    Audits,
    Clients,
    Policies,
    Principals,
    Resources,
    Roles,
    Users,
}

#[derive(Debug, Parser)]
pub struct SigninArgs {
    #[arg(long, value_name = "NAME")]
    pub username: String,

    #[arg(long, env = "AUTHZ_PASSWORD", hide_env_values = true, value_name = "PASSWORD")]
    pub password: String,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub collection: Collection,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,

    /// `field:asc|desc`
    #[arg(long, value_name = "FIELD:ORDER")]
    pub sort: Option<SortSpec>,

    /// `field:contains|is:value`
    #[arg(long, value_name = "FIELD:OP:VALUE")]
    pub filter: Option<FilterSpec>,
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    #[arg(long, value_name = "ID")]
    pub principal: String,

    /// Resource id; its kind and value are looked up before checking.
    #[arg(long, value_name = "ID")]
    pub resource: String,

    #[arg(long, value_name = "ID")]
    pub action: String,
}

#[derive(Debug, Parser)]
pub struct DeleteArgs {
    #[arg(value_enum)]
    pub collection: Collection,

    pub id: String,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}
