//! Exposes a `Client` struct to interact with the API.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::normalize::{none_to_empty, split_list, str_to_bool, strict_bool};
use super::session::{LoginResponse, SessionId};
use super::transport::{CallError, HttpTransport, Transport};
use super::Value;
use crate::config::{self, ConfigError, Credentials};
use crate::Error;

/// Default api endpoint.
pub const API_URL: &str = "https://api.webfaction.com/";

/// Used by `set_apache_acl` when no permission is given.
pub const DEFAULT_ACL_PERMISSION: &str = "rwx";

/// Everything needed to build a [`Client`].
///
/// Fields that are `None` fall back to the credentials file or the defaults.
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Example: `Web100`, for accounts spread over several machines
    pub machine: Option<String>,
    /// Defaults to `~/.webfrc`
    pub config_path: Option<PathBuf>,
    /// Example: `http://proxy.local:3128`
    pub proxy: Option<String>,
    /// Defaults to [`API_URL`]
    pub endpoint: Option<String>,
}

impl ClientOptions {
    /// Proxy and endpoint from the environment (`.env` included).
    pub fn from_env() -> ClientOptions {
        ClientOptions {
            proxy: dotenv::var("http_proxy").ok().filter(|s| !s.is_empty()),
            endpoint: dotenv::var("WEBFACTION_API_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            ..ClientOptions::default()
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> ClientOptions {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_machine(mut self, machine: &str) -> ClientOptions {
        self.machine = Some(machine.to_string());
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> ClientOptions {
        self.config_path = Some(path.into());
        self
    }

    /// Explicit credentials win, the credentials file is only read when
    /// username or password is missing.
    pub fn resolve_credentials(&self) -> Result<Credentials, ConfigError> {
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            return Ok(Credentials::new(username.as_str(), password.as_str()));
        }

        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => config::default_path()?,
        };
        config::load(&path)
    }
}

/// A remote database user, as returned by [`Client::create_db_user`].
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseUser {
    username: String,
    password: String,
    db_type: String,
}

impl DatabaseUser {
    /// Refer to an existing database user, e.g. to delete it.
    pub fn new(username: &str, password: &str, db_type: &str) -> DatabaseUser {
        DatabaseUser {
            username: username.to_string(),
            password: password.to_string(),
            db_type: db_type.to_string(),
        }
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn password(&self) -> &str {
        &self.password
    }
    /// `mysql` or `postgresql`
    pub fn db_type(&self) -> &str {
        &self.db_type
    }
    /// A handle the api could possibly resolve.
    pub fn is_valid(&self) -> bool {
        !self.username.is_empty() && !self.db_type.is_empty()
    }
}

impl fmt::Debug for DatabaseUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseUser")
            .field("username", &self.username)
            .field("password", &"***")
            .field("db_type", &self.db_type)
            .finish()
    }
}

/// Logged-in api session.
///
/// Every operation sends exactly one call. Failures are logged and turned
/// into the operation's failure value (`false`, an empty list or `None`).
pub struct Client {
    /// Use to make the XML-RPC calls
    transport: Box<dyn Transport>,
    /// Set once by `login`
    session_id: SessionId,
    /// Second half of the login response
    account: Value,
    /// Username we logged in with
    username: String,
}

impl Client {
    /// Resolve credentials, then log in over HTTPS.
    ///
    /// Nothing is sent when the credentials can't be resolved.
    pub fn connect(options: &ClientOptions) -> crate::Result<Client> {
        let credentials = options.resolve_credentials()?;
        let url = options.endpoint.as_deref().unwrap_or(API_URL);
        let transport = HttpTransport::new(url, options.proxy.as_deref())?;
        Client::login(Box::new(transport), &credentials, options.machine.as_deref())
    }

    /// Like [`Client::connect`] but over the given transport.
    pub fn with_transport(
        transport: Box<dyn Transport>,
        options: &ClientOptions,
    ) -> crate::Result<Client> {
        let credentials = options.resolve_credentials()?;
        Client::login(transport, &credentials, options.machine.as_deref())
    }

    fn login(
        transport: Box<dyn Transport>,
        credentials: &Credentials,
        machine: Option<&str>,
    ) -> crate::Result<Client> {
        let mut params = vec![
            Value::from(&credentials.username),
            Value::from(&credentials.password),
        ];
        if let Some(machine) = machine {
            params.push(machine.into());
        }

        let response = transport.call("login", &params).map_err(Error::Login)?;
        let LoginResponse {
            session_id,
            account,
        } = LoginResponse::from_value(response)?;
        log::debug!("session-id: {} account: {:?}", session_id, account);

        Ok(Client {
            transport,
            session_id,
            account,
            username: credentials.username.clone(),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
    pub fn account(&self) -> &Value {
        &self.account
    }
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Send `method` with the session id in front of `params`.
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, CallError> {
        let mut args = Vec::with_capacity(params.len() + 1);
        args.push(Value::from(&self.session_id));
        args.extend(params);
        self.transport.call(method, &args)
    }

    /// Call `method` about `subject` and log how it went.
    fn perform(&self, method: &str, subject: &str, params: Vec<Value>) -> Option<Value> {
        match self.call(method, params) {
            Ok(value) => {
                log::debug!("{}({}): {:?}", method, subject, value);
                Some(value)
            }
            Err(err) => {
                log::error!("{}", failure_message(method, subject, &err));
                None
            }
        }
    }

    /// Records of a `list_*` procedure, `None` if the call failed.
    pub(crate) fn fetch_records(&self, method: &str) -> Option<Vec<Value>> {
        match self.perform(method, "", Vec::new())? {
            Value::Array(items) => Some(items),
            other => {
                log::error!("{}: expected a list, got {:?}", method, other);
                None
            }
        }
    }

    /// Usage statistics and other read-only payloads.
    pub(crate) fn fetch(&self, method: &str) -> Option<Value> {
        self.perform(method, "", Vec::new())
    }

    pub fn create_app(&self, name: &str, app_type: &str, autostart: &str, extra_info: &str) -> bool {
        self.perform(
            "create_app",
            name,
            vec![
                name.into(),
                app_type.into(),
                str_to_bool(autostart).into(),
                none_to_empty(extra_info).into(),
            ],
        )
        .is_some()
    }

    pub fn delete_app(&self, name: &str) -> bool {
        self.perform("delete_app", name, vec![name.into()]).is_some()
    }

    pub fn list_apps(&self) -> Vec<Value> {
        self.fetch_records("list_apps").unwrap_or_default()
    }

    /// `db_type` is `mysql` or `postgresql`, the api does the checking.
    pub fn create_db(&self, name: &str, db_type: &str, password: &str) -> bool {
        self.perform(
            "create_db",
            name,
            vec![name.into(), db_type.into(), password.into()],
        )
        .is_some()
    }

    pub fn delete_db(&self, name: &str, db_type: &str) -> bool {
        self.perform("delete_db", name, vec![name.into(), db_type.into()])
            .is_some()
    }

    pub fn list_dbs(&self) -> Vec<Value> {
        self.fetch_records("list_dbs").unwrap_or_default()
    }

    pub fn list_db_users(&self) -> Vec<Value> {
        self.fetch_records("list_db_users").unwrap_or_default()
    }

    pub fn create_db_user(&self, username: &str, password: &str, db_type: &str) -> Option<DatabaseUser> {
        self.perform(
            "create_db_user",
            username,
            vec![username.into(), password.into(), db_type.into()],
        )
        .map(|_| DatabaseUser::new(username, password, db_type))
    }

    pub fn delete_db_user(&self, user: &DatabaseUser) -> bool {
        if !check_handle("delete_db_user", user) {
            return false;
        }
        self.perform(
            "delete_db_user",
            &user.username,
            vec![(&user.username).into(), (&user.db_type).into()],
        )
        .is_some()
    }

    pub fn grant_db_permissions(&self, user: &DatabaseUser, database: &str) -> bool {
        if !check_handle("grant_db_permissions", user) {
            return false;
        }
        self.perform(
            "grant_db_permissions",
            &user.username,
            vec![
                (&user.username).into(),
                database.into(),
                (&user.db_type).into(),
            ],
        )
        .is_some()
    }

    pub fn create_cronjob(&self, line: &str) -> bool {
        self.perform("create_cronjob", line, vec![line.into()])
            .is_some()
    }

    pub fn delete_cronjob(&self, line: &str) -> bool {
        self.perform("delete_cronjob", line, vec![line.into()])
            .is_some()
    }

    /// `subdomains` is a comma separated list, `none` for the bare domain.
    pub fn create_domain(&self, domain: &str, subdomains: &str) -> bool {
        let mut params = vec![Value::from(domain)];
        params.extend(
            split_list(none_to_empty(subdomains))
                .into_iter()
                .map(Value::from),
        );
        self.perform("create_domain", domain, params).is_some()
    }

    pub fn list_domains(&self) -> Vec<Value> {
        self.fetch_records("list_domains").unwrap_or_default()
    }

    /// `subdomains` and `site_apps` are comma separated lists.
    pub fn create_website(
        &self,
        name: &str,
        ip: &str,
        https: &str,
        subdomains: &str,
        site_apps: &str,
    ) -> bool {
        let subdomains = split_list(subdomains);
        let site_apps = split_list(site_apps);
        if site_apps.len() > 1 {
            log::warn!(
                "create_website({}): only one site app is supported, got {:?}",
                name,
                site_apps
            );
        }
        log::debug!("subdomains: {:?} site apps: {:?}", subdomains, site_apps);

        self.perform(
            "create_website",
            name,
            vec![
                name.into(),
                ip.into(),
                str_to_bool(https).into(),
                subdomains.into(),
                site_apps.into(),
            ],
        )
        .is_some()
    }

    pub fn list_websites(&self) -> Vec<Value> {
        self.fetch_records("list_websites").unwrap_or_default()
    }

    /// Fields after `domain` may be `none` to leave them empty.
    pub fn create_dns_override(
        &self,
        domain: &str,
        a_ip: &str,
        cname: &str,
        mx_name: &str,
        mx_priority: &str,
        spf_record: &str,
    ) -> bool {
        self.dns_override(
            "create_dns_override",
            domain,
            [a_ip, cname, mx_name, mx_priority, spf_record],
        )
    }

    /// Same arguments as [`Client::create_dns_override`].
    pub fn delete_dns_override(
        &self,
        domain: &str,
        a_ip: &str,
        cname: &str,
        mx_name: &str,
        mx_priority: &str,
        spf_record: &str,
    ) -> bool {
        self.dns_override(
            "delete_dns_override",
            domain,
            [a_ip, cname, mx_name, mx_priority, spf_record],
        )
    }

    fn dns_override(&self, method: &str, domain: &str, records: [&str; 5]) -> bool {
        let mut params = vec![Value::from(domain)];
        params.extend(records.iter().map(|record| Value::from(none_to_empty(record))));
        self.perform(method, domain, params).is_some()
    }

    /// `targets` names the mailboxes (or addresses) to deliver to.
    pub fn create_email(
        &self,
        email_address: &str,
        targets: &str,
        autoresponder_on: &str,
        autoresponder_subject: &str,
        autoresponder_message: &str,
        autoresponder_from: &str,
    ) -> bool {
        self.perform(
            "create_email",
            email_address,
            vec![
                email_address.into(),
                targets.into(),
                str_to_bool(autoresponder_on).into(),
                none_to_empty(autoresponder_subject).into(),
                none_to_empty(autoresponder_message).into(),
                none_to_empty(autoresponder_from).into(),
            ],
        )
        .is_some()
    }

    pub fn delete_email(&self, email_address: &str) -> bool {
        self.perform("delete_email", email_address, vec![email_address.into()])
            .is_some()
    }

    pub fn list_emails(&self) -> Vec<Value> {
        self.fetch_records("list_emails").unwrap_or_default()
    }

    /// Prints the password the api generated for the new mailbox.
    ///
    /// `enable_spam_protection` must be `true` or `false`, anything else is
    /// refused without contacting the api.
    pub fn create_mailbox(
        &self,
        mailbox: &str,
        enable_spam_protection: &str,
        share: &str,
        spam_to_learn_folder: &str,
        ham_to_learn_folder: &str,
    ) -> bool {
        let Some(spam_protection) = strict_bool(enable_spam_protection) else {
            log::error!(
                "create_mailbox({}): enable_spam_protection must be true or false, got `{}`",
                mailbox,
                enable_spam_protection
            );
            return false;
        };

        let Some(result) = self.perform(
            "create_mailbox",
            mailbox,
            vec![
                mailbox.into(),
                spam_protection.into(),
                str_to_bool(share).into(),
                spam_to_learn_folder.into(),
                ham_to_learn_folder.into(),
            ],
        ) else {
            return false;
        };

        match result.get("password").and_then(Value::as_str) {
            Some(password) => println!("Password for the new mailbox is: {}", password),
            None => log::warn!("create_mailbox({}): response has no password", mailbox),
        }
        true
    }

    pub fn delete_mailbox(&self, mailbox: &str) -> bool {
        self.perform("delete_mailbox", mailbox, vec![mailbox.into()])
            .is_some()
    }

    pub fn list_mailboxes(&self) -> Vec<Value> {
        self.fetch_records("list_mailboxes").unwrap_or_default()
    }

    /// Grant the web server access to `paths`, `permission` defaults to
    /// [`DEFAULT_ACL_PERMISSION`].
    pub fn set_apache_acl(&self, paths: &str, permission: Option<&str>, recursive: bool) -> bool {
        let permission = permission
            .map(none_to_empty)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_ACL_PERMISSION);
        self.perform(
            "set_apache_acl",
            paths,
            vec![paths.into(), permission.into(), recursive.into()],
        )
        .is_some()
    }

    /// Run `cmd` in the home directory, returns its output.
    pub fn system(&self, cmd: &str) -> Option<String> {
        self.perform("system", cmd, vec![cmd.into()])
            .map(|value| match value {
                Value::String(output) => output,
                other => other.to_json().to_string(),
            })
    }

    /// `mode` is `w` (default) to overwrite or `a` to append.
    pub fn write_file(&self, filename: &str, content: &str, mode: &str) -> bool {
        let mode = match none_to_empty(mode) {
            "" => "w",
            mode => mode,
        };
        self.perform(
            "write_file",
            filename,
            vec![filename.into(), content.into(), mode.into()],
        )
        .is_some()
    }

    pub fn list_disk_usage(&self) -> Option<Value> {
        self.fetch("list_disk_usage")
    }

    pub fn list_bandwidth_usage(&self) -> Option<Value> {
        self.fetch("list_bandwidth_usage")
    }
}

fn check_handle(method: &str, user: &DatabaseUser) -> bool {
    if !user.is_valid() {
        log::error!(
            "{}: database user needs a username and a db type, got {:?}",
            method,
            user
        );
    }
    user.is_valid()
}

fn failure_message(method: &str, subject: &str, err: &CallError) -> String {
    if subject.is_empty() {
        format!("{} failed: {}", method, err)
    } else {
        format!("{}({}) failed: {}", method, subject, err)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use log::Level;

    use super::{failure_message, Client, ClientOptions, DatabaseUser};
    use crate::api::testing::{captured_logs, client_with, fault, recording, Calls};
    use crate::{CallError, Error, Value};

    fn args(calls: &Calls, idx: usize) -> (String, Vec<Value>) {
        calls.borrow()[idx].clone()
    }

    #[test]
    fn login_before_anything_else() {
        let (client, calls) = client_with(|_, _| Ok(Value::Bool(true)));

        assert_eq!(client.session_id().as_str(), "S1");
        assert_eq!(client.username(), "u");
        assert_eq!(client.account().get("username"), Some(&Value::from("u")));
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(args(&calls, 0), ("login".to_string(), vec!["u".into(), "p".into()]));

        assert!(client.delete_app("old"));
        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(args(&calls, 1).1[0], Value::from("S1"));
    }

    #[test]
    fn login_with_machine() {
        let (transport, calls) = recording(|_, _| {
            Ok(Value::Array(vec!["S2".into(), Value::Nil]))
        });
        let options = ClientOptions::default()
            .with_credentials("u", "p")
            .with_machine("Web100");

        let client = Client::with_transport(Box::new(transport), &options).unwrap();
        assert_eq!(client.session_id().as_str(), "S2");
        assert_eq!(
            args(&calls, 0).1,
            vec![Value::from("u"), Value::from("p"), Value::from("Web100")]
        );
    }

    #[test]
    fn missing_config_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let (transport, calls) = recording(|_, _| Ok(Value::Nil));
        let options = ClientOptions::default().with_config_path(dir.path().join(".webfrc"));

        let result = Client::with_transport(Box::new(transport), &options);
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn partial_credentials_use_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "username=fileuser\npassword=filepass").unwrap();

        let (transport, calls) = recording(|_, _| {
            Ok(Value::Array(vec!["S1".into(), Value::Nil]))
        });
        let options = ClientOptions {
            username: Some("ignored".to_string()),
            ..ClientOptions::default().with_config_path(file.path())
        };

        Client::with_transport(Box::new(transport), &options).unwrap();
        assert_eq!(
            args(&calls, 0).1,
            vec![Value::from("fileuser"), Value::from("filepass")]
        );
    }

    #[test]
    fn failed_login_is_fatal() {
        let (transport, calls) = recording(|_, _| Err(fault(1, "LoginError")));
        let options = ClientOptions::default().with_credentials("u", "bad");

        let result = Client::with_transport(Box::new(transport), &options);
        assert!(matches!(result, Err(Error::Login(CallError::Fault { code: 1, .. }))));
        assert_eq!(calls.borrow().len(), 1);

        let (transport, _) = recording(|_, _| Ok(Value::from("not a pair")));
        let result = Client::with_transport(Box::new(transport), &options);
        assert!(matches!(result, Err(Error::Session(_))));
    }

    #[test]
    fn create_app_normalizes() {
        let (client, calls) = client_with(|_, _| Ok(Value::Nil));

        assert!(client.create_app("myapp", "python2", "true", "none"));
        assert_eq!(
            args(&calls, 1),
            (
                "create_app".to_string(),
                vec![
                    "S1".into(),
                    "myapp".into(),
                    "python2".into(),
                    Value::Bool(true),
                    "".into()
                ]
            )
        );

        assert!(client.create_app("other", "static", "yes", "--port 80"));
        assert_eq!(args(&calls, 2).1[3], Value::Bool(false));
        assert_eq!(args(&calls, 2).1[4], Value::from("--port 80"));
    }

    #[test]
    fn create_website_splits_lists() {
        let (client, calls) = client_with(|_, _| Ok(Value::Nil));

        assert!(client.create_website("site", "1.2.3.4", "True", "a,b", "app1"));
        assert_eq!(
            args(&calls, 1),
            (
                "create_website".to_string(),
                vec![
                    "S1".into(),
                    "site".into(),
                    "1.2.3.4".into(),
                    Value::Bool(true),
                    Value::from(vec!["a", "b"]),
                    Value::from(vec!["app1"]),
                ]
            )
        );

        // items are trimmed, an empty list stays empty
        assert!(client.create_website("site", "1.2.3.4", "false", "", " app1"));
        assert_eq!(
            args(&calls, 2).1[4..],
            [Value::Array(Vec::new()), Value::from(vec!["app1"])]
        );
    }

    #[test]
    fn options_from_env() {
        std::env::set_var("http_proxy", "http://proxy.local:3128");
        std::env::set_var("WEBFACTION_API_URL", "https://api.example.test/");
        let options = ClientOptions::from_env();
        assert_eq!(options.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert_eq!(options.endpoint.as_deref(), Some("https://api.example.test/"));
        assert_eq!(options.username, None);

        std::env::set_var("http_proxy", "");
        std::env::set_var("WEBFACTION_API_URL", "");
        let options = ClientOptions::from_env();
        assert_eq!(options.proxy, None);
        assert_eq!(options.endpoint, None);

        std::env::remove_var("http_proxy");
        std::env::remove_var("WEBFACTION_API_URL");
        assert_eq!(ClientOptions::from_env().proxy, None);
    }

    #[test]
    fn fault_is_failure_without_further_calls() {
        let (client, calls) = client_with(|_, _| Err(fault(1, "Mailbox does not exist.")));

        let (deleted, logs) = captured_logs(|| client.delete_mailbox("box1"));
        assert!(!deleted);
        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(args(&calls, 1).0, "delete_mailbox");

        let errors: Vec<_> = logs
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, msg)| msg.as_str())
            .collect();
        assert_eq!(
            errors,
            ["delete_mailbox(box1) failed: fault 1: Mailbox does not exist."]
        );
    }

    #[test]
    fn failure_message_without_subject() {
        let err = fault(2, "boom");
        assert_eq!(failure_message("list_apps", "", &err), "list_apps failed: fault 2: boom");
    }

    #[test]
    fn listing_failure_is_empty() {
        let (client, _) = client_with(|method, _| match method {
            "list_apps" => Err(fault(2, "boom")),
            "list_dbs" => Ok(Value::from(vec!["db1", "db2"])),
            _ => Ok(Value::from("not a list")),
        });

        assert!(client.list_apps().is_empty());
        assert_eq!(client.list_dbs(), vec![Value::from("db1"), Value::from("db2")]);
        assert!(client.list_db_users().is_empty());
        assert!(client.fetch_records("list_apps").is_none());
    }

    #[test]
    fn usage_payloads() {
        let usage: Value = [("total".to_string(), Value::Int(42))].into_iter().collect();
        let expected = usage.clone();
        let (client, _) = client_with(move |method, _| match method {
            "list_disk_usage" => Ok(usage.clone()),
            _ => Err(fault(3, "nope")),
        });

        assert_eq!(client.list_disk_usage(), Some(expected));
        assert_eq!(client.list_bandwidth_usage(), None);
    }

    #[test]
    fn db_user_handle() {
        let (client, calls) = client_with(|method, _| match method {
            "create_db_user" => Ok(Value::Nil),
            _ => Ok(Value::Bool(true)),
        });

        let user = client.create_db_user("dbu", "secret", "postgresql").unwrap();
        assert_eq!(user, DatabaseUser::new("dbu", "secret", "postgresql"));
        assert_eq!(user.username(), "dbu");
        assert_eq!(user.password(), "secret");
        assert_eq!(user.db_type(), "postgresql");

        assert!(client.grant_db_permissions(&user, "mydb"));
        assert_eq!(
            args(&calls, 2),
            (
                "grant_db_permissions".to_string(),
                vec!["S1".into(), "dbu".into(), "mydb".into(), "postgresql".into()]
            )
        );

        assert!(client.delete_db_user(&user));
        assert_eq!(
            args(&calls, 3).1,
            vec![Value::from("S1"), Value::from("dbu"), Value::from("postgresql")]
        );
    }

    #[test]
    fn db_user_failure_and_bad_handles() {
        let (client, calls) = client_with(|_, _| Err(fault(1, "exists")));
        assert_eq!(client.create_db_user("dbu", "secret", "mysql"), None);
        assert_eq!(calls.borrow().len(), 2);

        let bad = DatabaseUser::new("", "secret", "mysql");
        let (deleted, logs) = captured_logs(|| client.delete_db_user(&bad));
        assert!(!deleted);
        assert!(!client.grant_db_permissions(&DatabaseUser::new("dbu", "", ""), "mydb"));
        assert_eq!(calls.borrow().len(), 2);

        assert_eq!(logs.len(), 1);
        assert!(logs[0].1.starts_with("delete_db_user: database user needs"));
        assert!(!logs[0].1.contains("secret"));
    }

    #[test]
    fn db_user_debug_hides_password() {
        let user = DatabaseUser::new("dbu", "secret", "mysql");
        let debug = format!("{:?}", user);
        assert!(debug.contains("dbu"));
        assert!(debug.contains("mysql"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn create_email_normalizes() {
        let (client, calls) = client_with(|_, _| Ok(Value::Nil));

        assert!(client.create_email("me@example.com", "box1", "TRUE", "none", "Away", "NONE"));
        assert_eq!(
            args(&calls, 1).1,
            vec![
                Value::from("S1"),
                Value::from("me@example.com"),
                Value::from("box1"),
                Value::Bool(true),
                Value::from(""),
                Value::from("Away"),
                Value::from(""),
            ]
        );
        assert!(client.delete_email("me@example.com"));
    }

    #[test]
    fn create_mailbox_checks_spam_flag() {
        let (client, calls) = client_with(|_, _| {
            Ok([("password".to_string(), Value::from("generated"))]
                .into_iter()
                .collect())
        });

        assert!(!client.create_mailbox("box1", "maybe", "false", "spam", "ham"));
        assert_eq!(calls.borrow().len(), 1);

        assert!(client.create_mailbox("box1", "FALSE", "true", "spam", "ham"));
        assert_eq!(
            args(&calls, 1).1,
            vec![
                Value::from("S1"),
                Value::from("box1"),
                Value::Bool(false),
                Value::Bool(true),
                Value::from("spam"),
                Value::from("ham"),
            ]
        );
    }

    #[test]
    fn apache_acl_defaults() {
        let (client, calls) = client_with(|_, _| Ok(Value::Nil));

        assert!(client.set_apache_acl("/home/u/webapps/app", None, false));
        assert!(client.set_apache_acl("/home/u/logs", Some("none"), true));
        assert!(client.set_apache_acl("/home/u/tmp", Some("rx"), false));

        assert_eq!(args(&calls, 1).1[2], Value::from("rwx"));
        assert_eq!(args(&calls, 1).1[3], Value::Bool(false));
        assert_eq!(args(&calls, 2).1[2], Value::from("rwx"));
        assert_eq!(args(&calls, 2).1[3], Value::Bool(true));
        assert_eq!(args(&calls, 3).1[2], Value::from("rx"));
    }

    #[test]
    fn domains_and_overrides() {
        let (client, calls) = client_with(|_, _| Ok(Value::Nil));

        assert!(client.create_domain("example.com", "www,blog"));
        assert_eq!(
            args(&calls, 1).1,
            vec![
                Value::from("S1"),
                Value::from("example.com"),
                Value::from("www"),
                Value::from("blog"),
            ]
        );

        assert!(client.create_domain("example.org", "none"));
        assert_eq!(args(&calls, 2).1.len(), 2);

        assert!(client.create_dns_override("example.com", "1.2.3.4", "none", "none", "none", "none"));
        assert_eq!(
            args(&calls, 3),
            (
                "create_dns_override".to_string(),
                vec![
                    "S1".into(),
                    "example.com".into(),
                    "1.2.3.4".into(),
                    "".into(),
                    "".into(),
                    "".into(),
                    "".into(),
                ]
            )
        );
        assert!(client.delete_dns_override("example.com", "1.2.3.4", "", "", "", ""));
        assert_eq!(args(&calls, 4).0, "delete_dns_override");
    }

    #[test]
    fn cronjobs_databases_and_files() {
        let (client, calls) = client_with(|_, _| Ok(Value::Nil));

        assert!(client.create_cronjob("0 * * * * ~/bin/backup"));
        assert!(client.delete_cronjob("0 * * * * ~/bin/backup"));
        assert!(client.create_db("mydb", "mysql", "pw"));
        assert!(client.delete_db("mydb", "mysql"));
        assert!(client.write_file("notes.txt", "hello", "none"));

        let methods = calls
            .borrow()
            .iter()
            .map(|(method, _)| method.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            methods,
            [
                "login",
                "create_cronjob",
                "delete_cronjob",
                "create_db",
                "delete_db",
                "write_file"
            ]
        );
        assert_eq!(
            args(&calls, 3).1,
            vec![Value::from("S1"), Value::from("mydb"), Value::from("mysql"), Value::from("pw")]
        );
        assert_eq!(args(&calls, 5).1[3], Value::from("w"));
    }

    #[test]
    fn system_output() {
        let (client, _) = client_with(|_, params| match params[1].as_str() {
            Some("ls") => Ok(Value::from("webapps\nlogs\n")),
            _ => Err(fault(1, "denied")),
        });

        assert_eq!(client.system("ls").as_deref(), Some("webapps\nlogs\n"));
        assert_eq!(client.system("rm -rf /"), None);
    }
}
