pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod output;
pub mod query;
pub mod ranking;
pub mod resolver;
pub mod selector;
pub mod testing;

pub use auth::{AuthError, Credentials, FileTokenCache, Token, TokenManager};
pub use catalog::{CandidateEntity, CatalogSearch, EntityKind, SearchError, SpotifyCatalog};
pub use config::{
    default_config_path, load_config, load_config_from_str, load_config_or_default,
    validate_config, Config, ConfigCredentialStore, ConfigError, CredentialStore,
    SanitizedConfig,
};
pub use error::ResolveError;
pub use http::{HttpBackend, ReqwestBackend, ResilientTransport, RetryPolicy, TransportError};
pub use output::{
    render_listing, ClipboardCommand, DeliveryChain, DeliveryError, ListFormat, OutputSink,
    StdoutSink,
};
pub use query::{QueryBuilder, QueryInput, SearchQuery, ValidationError};
pub use ranking::{rank, CandidateList, RankOptions, RankOrder};
pub use resolver::{Resolution, Resolver, ResolverSettings};
pub use selector::{
    PresentChoice, PresentRequest, Presenter, Selection, SelectionError, SelectionMode, Selector,
};
