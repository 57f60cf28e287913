//! Command-line front end.
//!
//! Every api operation is one `--flag` taking a fixed number of values. The
//! [`commands`] table drives both the argument parser and the dispatch.

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{crate_name, crate_version, Arg, ArgAction, ArgMatches};

use crate::api::normalize::str_to_bool;
use crate::api::{Client, ClientOptions, DatabaseUser, Value};
use crate::logger;

const API_HEADING: &str = "WebFaction Commands";

/// One api operation reachable from the command line.
pub struct Command {
    /// Flag name without the leading `--`
    pub name: &'static str,
    /// Names of the values the flag takes, empty for a plain switch
    pub values: &'static [&'static str],
    pub help: &'static str,
    /// Gets exactly `values.len()` arguments, returns whether it succeeded
    pub run: fn(&Client, &[String]) -> bool,
}

/// Dispatch table, the first flag present on the command line wins.
pub fn commands() -> Vec<Command> {
    vec![
        Command {
            name: "create-app",
            values: &["NAME", "TYPE", "AUTOSTART", "EXTRA_INFO"],
            help: "Create application",
            run: |client, args| match args {
                [name, app_type, autostart, extra_info] => {
                    client.create_app(name, app_type, autostart, extra_info)
                }
                _ => false,
            },
        },
        Command {
            name: "delete-app",
            values: &["NAME"],
            help: "Delete application",
            run: |client, args| match args {
                [name] => client.delete_app(name),
                _ => false,
            },
        },
        Command {
            name: "list-apps",
            values: &[],
            help: "List applications",
            run: |client, _| print_records(client, "list_apps"),
        },
        Command {
            name: "create-cronjob",
            values: &["CRONJOB"],
            help: "Create cronjob",
            run: |client, args| match args {
                [line] => client.create_cronjob(line),
                _ => false,
            },
        },
        Command {
            name: "delete-cronjob",
            values: &["CRONJOB"],
            help: "Delete cronjob",
            run: |client, args| match args {
                [line] => client.delete_cronjob(line),
                _ => false,
            },
        },
        Command {
            name: "create-db",
            values: &["NAME", "DB_TYPE", "PASSWORD"],
            help: "Create database",
            run: |client, args| match args {
                [name, db_type, password] => client.create_db(name, db_type, password),
                _ => false,
            },
        },
        Command {
            name: "delete-db",
            values: &["NAME", "DB_TYPE"],
            help: "Delete database",
            run: |client, args| match args {
                [name, db_type] => client.delete_db(name, db_type),
                _ => false,
            },
        },
        Command {
            name: "list-dbs",
            values: &[],
            help: "List databases",
            run: |client, _| print_records(client, "list_dbs"),
        },
        Command {
            name: "create-db-user",
            values: &["USERNAME", "PASSWORD", "DB_TYPE"],
            help: "Create database user",
            run: |client, args| match args {
                [username, password, db_type] => client
                    .create_db_user(username, password, db_type)
                    .is_some_and(|user| print_json(&serde_json::json!(user))),
                _ => false,
            },
        },
        Command {
            name: "delete-db-user",
            values: &["USERNAME", "DB_TYPE"],
            help: "Delete database user",
            run: |client, args| match args {
                [username, db_type] => {
                    client.delete_db_user(&DatabaseUser::new(username, "", db_type))
                }
                _ => false,
            },
        },
        Command {
            name: "grant-db-permissions",
            values: &["USERNAME", "DATABASE", "DB_TYPE"],
            help: "Grant a database user full access to a database",
            run: |client, args| match args {
                [username, database, db_type] => client
                    .grant_db_permissions(&DatabaseUser::new(username, "", db_type), database),
                _ => false,
            },
        },
        Command {
            name: "list-db-users",
            values: &[],
            help: "List database users",
            run: |client, _| print_records(client, "list_db_users"),
        },
        Command {
            name: "create-domain",
            values: &["DOMAIN", "SUBDOMAINS"],
            help: "Create domain",
            run: |client, args| match args {
                [domain, subdomains] => client.create_domain(domain, subdomains),
                _ => false,
            },
        },
        Command {
            name: "list-domains",
            values: &[],
            help: "List domains",
            run: |client, _| print_records(client, "list_domains"),
        },
        Command {
            name: "create-website",
            values: &["NAME", "IP", "HTTPS", "SUBDOMAINS", "SITE_APPS"],
            help: "Create website",
            run: |client, args| match args {
                [name, ip, https, subdomains, site_apps] => {
                    client.create_website(name, ip, https, subdomains, site_apps)
                }
                _ => false,
            },
        },
        Command {
            name: "list-websites",
            values: &[],
            help: "List websites",
            run: |client, _| print_records(client, "list_websites"),
        },
        Command {
            name: "create-dns-override",
            values: &["DOMAIN", "A_IP", "CNAME", "MX_NAME", "MX_PRIORITY", "SPF_RECORD"],
            help: "Create DNS override",
            run: |client, args| match args {
                [domain, a_ip, cname, mx_name, mx_priority, spf_record] => client
                    .create_dns_override(domain, a_ip, cname, mx_name, mx_priority, spf_record),
                _ => false,
            },
        },
        Command {
            name: "delete-dns-override",
            values: &["DOMAIN", "A_IP", "CNAME", "MX_NAME", "MX_PRIORITY", "SPF_RECORD"],
            help: "Delete DNS override",
            run: |client, args| match args {
                [domain, a_ip, cname, mx_name, mx_priority, spf_record] => client
                    .delete_dns_override(domain, a_ip, cname, mx_name, mx_priority, spf_record),
                _ => false,
            },
        },
        Command {
            name: "create-email",
            values: &["EMAIL_ADDRESS", "TARGETS", "AR_ON", "AR_SUBJECT", "AR_MSG", "AR_FROM"],
            help: "Create email address",
            run: |client, args| match args {
                [address, targets, on, subject, message, from] => {
                    client.create_email(address, targets, on, subject, message, from)
                }
                _ => false,
            },
        },
        Command {
            name: "delete-email",
            values: &["EMAIL_ADDRESS"],
            help: "Delete email address",
            run: |client, args| match args {
                [address] => client.delete_email(address),
                _ => false,
            },
        },
        Command {
            name: "list-emails",
            values: &[],
            help: "List email addresses",
            run: |client, _| print_records(client, "list_emails"),
        },
        Command {
            name: "create-mailbox",
            values: &["MBOX_NAME", "SPAM_PROT", "SHARE", "SPAM_LEARN", "HAM_LEARN"],
            help: "Create mailbox",
            run: |client, args| match args {
                [mailbox, spam, share, spam_folder, ham_folder] => {
                    client.create_mailbox(mailbox, spam, share, spam_folder, ham_folder)
                }
                _ => false,
            },
        },
        Command {
            name: "delete-mailbox",
            values: &["MBOX_NAME"],
            help: "Delete mailbox",
            run: |client, args| match args {
                [mailbox] => client.delete_mailbox(mailbox),
                _ => false,
            },
        },
        Command {
            name: "list-mailboxes",
            values: &[],
            help: "List mailboxes",
            run: |client, _| print_records(client, "list_mailboxes"),
        },
        Command {
            name: "set-apache-acl",
            values: &["PATHS", "PERMS", "RECURSIVE"],
            help: "Set Apache ACL",
            run: |client, args| match args {
                [paths, perms, recursive] => {
                    client.set_apache_acl(paths, Some(perms.as_str()), str_to_bool(recursive))
                }
                _ => false,
            },
        },
        Command {
            name: "system",
            values: &["CMD"],
            help: "Run system command",
            run: |client, args| match args {
                [cmd] => match client.system(cmd) {
                    Some(output) => {
                        print!("{}", output);
                        true
                    }
                    None => false,
                },
                _ => false,
            },
        },
        Command {
            name: "write-file",
            values: &["FILENAME", "STRING", "MODE"],
            help: "Write file",
            run: |client, args| match args {
                [filename, content, mode] => client.write_file(filename, content, mode),
                _ => false,
            },
        },
        Command {
            name: "list-disk-usage",
            values: &[],
            help: "Show disk usage",
            run: |client, _| client.list_disk_usage().is_some_and(|usage| print_value(&usage)),
        },
        Command {
            name: "list-bandwidth-usage",
            values: &[],
            help: "Show bandwidth usage",
            run: |client, _| {
                client
                    .list_bandwidth_usage()
                    .is_some_and(|usage| print_value(&usage))
            },
        },
    ]
}

/// Argument parser built from [`commands`].
pub fn command() -> clap::Command {
    let mut cmd = clap::Command::new(crate_name!())
        .version(crate_version!())
        .about("Command-line tool for the WebFaction XML-RPC API")
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Show debugging information"),
        )
        .arg(
            Arg::new("machine")
                .long("machine")
                .value_name("MACHINE")
                .help("Log in to a specific machine of the account"),
        );

    for spec in commands() {
        let arg = Arg::new(spec.name)
            .long(spec.name)
            .help(spec.help)
            .help_heading(API_HEADING);
        let arg = if spec.values.is_empty() {
            arg.action(ArgAction::SetTrue)
        } else {
            arg.action(ArgAction::Set)
                .num_args(spec.values.len())
                .value_names(spec.values.iter().copied())
        };
        cmd = cmd.arg(arg);
    }
    cmd
}

/// The command to run and its arguments.
pub fn selected(matches: &ArgMatches) -> Option<(Command, Vec<String>)> {
    commands().into_iter().find_map(|spec| {
        let args = if spec.values.is_empty() {
            matches.get_flag(spec.name).then(Vec::new)
        } else {
            matches
                .get_many::<String>(spec.name)
                .map(|values| values.cloned().collect())
        }?;
        Some((spec, args))
    })
}

/// Parse `args`, log in and run the selected command.
pub fn run<I, T>(args: I) -> anyhow::Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cmd = command();
    let matches = match cmd.try_get_matches_from_mut(args) {
        Ok(matches) => matches,
        Err(err) => {
            err.print().context("print usage")?;
            return Ok(match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            });
        }
    };

    logger::init(matches.get_flag("debug")).context("initialize logger")?;

    if let Ok(path) = dotenv::dotenv() {
        log::debug!("loaded .env from {}", path.display());
    }

    let Some((spec, args)) = selected(&matches) else {
        cmd.print_help().context("print help")?;
        println!();
        return Ok(ExitCode::FAILURE);
    };

    let mut options = ClientOptions::from_env();
    options.machine = matches.get_one::<String>("machine").cloned();

    let client = match Client::connect(&options) {
        Ok(client) => client,
        Err(err) => {
            log::error!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    Ok(if (spec.run)(&client, &args) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_records(client: &Client, method: &str) -> bool {
    client
        .fetch_records(method)
        .is_some_and(|records| print_value(&Value::Array(records)))
}

fn print_value(value: &Value) -> bool {
    print_json(&value.to_json())
}

fn print_json(json: &serde_json::Value) -> bool {
    match serde_json::to_string_pretty(json) {
        Ok(text) => {
            println!("{}", text);
            true
        }
        Err(err) => {
            log::error!("couldn't render response: {}", err);
            false
        }
    }
}
