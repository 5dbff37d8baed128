//! Binary entry point for the pgprov CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use pgprov::{
    AdminError, AssumeYes, ClusterReset, CommandRunner, ConfigError, DatabaseRequest, HbaUpload,
    PgAdmin, PostgresConfig, QueryRequest, Session, SshConfig, SshError, TerminalConfirm,
};

mod cli;

use cli::{
    ChangePasswordCommand, Cli, CreateDbCommand, CreateUserCommand, QueryCommand,
    ResetClusterCommand, UploadHbaCommand,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid flags {flags:?}: {message}")]
    Flags { flags: String, message: String },
    #[error(transparent)]
    Admin(#[from] AdminError),
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<SshError> for CliError {
    fn from(value: SshError) -> Self {
        Self::Config(value.to_string())
    }
}

fn main() {
    pgprov::logging::init();
    let cli = Cli::parse();
    let exit_code = match connect().and_then(|admin| dispatch(&admin, cli)) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn connect() -> Result<PgAdmin<pgprov::ProcessCommandRunner>, CliError> {
    let ssh_config =
        SshConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let settings = PostgresConfig::load_without_cli_args()?;
    let session = Session::with_process_runner(ssh_config)?;
    Ok(PgAdmin::new(session, settings)?)
}

fn dispatch<R: CommandRunner>(admin: &PgAdmin<R>, cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::CreateUser(args) => create_user(admin, args),
        Cli::Query(args) => query(admin, args),
        Cli::UserExists(args) => Ok(report_bool(admin.db_user_exists(&args.name)?)),
        Cli::DbExists(args) => Ok(report_bool(admin.db_exists(&args.name)?)),
        Cli::ChangePassword(ChangePasswordCommand { username, password }) => {
            admin.change_db_user_password(&username, &password)?;
            Ok(0)
        }
        Cli::CreateDb(args) => create_db(admin, args),
        Cli::UploadHba(args) => upload_hba(admin, args),
        Cli::DetectVersion => {
            let version = admin.detect_version()?;
            writeln!(io::stdout(), "{version}").ok();
            Ok(0)
        }
        Cli::ResetCluster(args) => reset_cluster(admin, args),
    }
}

fn create_user<R: CommandRunner>(
    admin: &PgAdmin<R>,
    args: CreateUserCommand,
) -> Result<i32, CliError> {
    if args.skip_existing && admin.db_user_exists(&args.username)? {
        tracing::info!(username = %args.username, "role already exists; skipping");
        return Ok(0);
    }
    let flags = args.flags.as_deref().map(split_flags).transpose()?;
    admin.create_db_user(&args.username, args.password.as_deref(), flags.as_deref())?;
    Ok(0)
}

fn query<R: CommandRunner>(admin: &PgAdmin<R>, args: QueryCommand) -> Result<i32, CliError> {
    let mut request = QueryRequest::new(args.sql).use_sudo(args.sudo);
    if let Some(flags) = args.flags.as_deref() {
        request = request.flags(split_flags(flags)?);
    }
    if let Some(database) = args.database {
        request = request.database(database);
    }
    let output = admin.execute_query(&request)?;
    write!(io::stdout(), "{}", output.stdout).ok();
    Ok(0)
}

fn create_db<R: CommandRunner>(admin: &PgAdmin<R>, args: CreateDbCommand) -> Result<i32, CliError> {
    if args.skip_existing && admin.db_exists(&args.name)? {
        tracing::info!(database = %args.name, "database already exists; skipping");
        return Ok(0);
    }
    let encoding = args
        .encoding
        .unwrap_or_else(|| admin.settings().default_encoding.clone());
    let mut request = DatabaseRequest::new(args.name)
        .encoding(encoding)
        .template(args.template);
    if let Some(owner) = args.owner {
        request = request.owner(owner);
    }
    admin.create_db(&request)?;
    Ok(0)
}

fn upload_hba<R: CommandRunner>(
    admin: &PgAdmin<R>,
    args: UploadHbaCommand,
) -> Result<i32, CliError> {
    let upload = HbaUpload {
        template_name: args.template,
        pg_version: args.pg_version,
        cluster: args
            .cluster
            .unwrap_or_else(|| admin.settings().default_cluster.clone()),
        restart: !args.no_restart,
    };
    let destination = admin.upload_pg_hba_conf(&upload)?;
    writeln!(io::stdout(), "{destination}").ok();
    Ok(0)
}

fn reset_cluster<R: CommandRunner>(
    admin: &PgAdmin<R>,
    args: ResetClusterCommand,
) -> Result<i32, CliError> {
    let settings = admin.settings();
    let reset = ClusterReset {
        cluster: args
            .cluster
            .unwrap_or_else(|| settings.default_cluster.clone()),
        pg_version: args.pg_version,
        encoding: args
            .encoding
            .unwrap_or_else(|| settings.default_encoding.clone()),
        locale: args.locale.unwrap_or_else(|| settings.default_locale.clone()),
    };
    if args.yes {
        admin.reset_cluster(&reset, &AssumeYes)?;
    } else {
        admin.reset_cluster(&reset, &TerminalConfirm)?;
    }
    Ok(0)
}

fn split_flags(flags: &str) -> Result<Vec<String>, CliError> {
    shell_words::split(flags).map_err(|err| CliError::Flags {
        flags: flags.to_owned(),
        message: err.to_string(),
    })
}

fn report_bool(value: bool) -> i32 {
    writeln!(io::stdout(), "{value}").ok();
    i32::from(!value)
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgprov::test_support::ScriptedRunner;
    use rstest::{fixture, rstest};

    #[fixture]
    fn runner() -> ScriptedRunner {
        ScriptedRunner::new()
    }

    fn admin(runner: &ScriptedRunner) -> PgAdmin<ScriptedRunner> {
        let session =
            Session::new(SshConfig::for_host("db.example"), runner.clone()).expect("session");
        PgAdmin::new(session, PostgresConfig::default()).expect("admin")
    }

    #[rstest]
    #[case("-S -D -R", &["-S", "-D", "-R"])]
    #[case("--connection-limit 5 -P", &["--connection-limit", "5", "-P"])]
    #[case("-c 'with space'", &["-c", "with space"])]
    fn split_flags_uses_shell_rules(#[case] input: &str, #[case] expected: &[&str]) {
        let flags = split_flags(input).expect("flags should split");
        assert_eq!(flags, expected);
    }

    #[rstest]
    fn split_flags_rejects_unbalanced_quotes() {
        let err = split_flags("-c 'open").expect_err("unbalanced quote");
        assert!(matches!(err, CliError::Flags { .. }), "unexpected error: {err}");
    }

    #[rstest]
    fn create_user_skips_existing_role(runner: ScriptedRunner) {
        runner.push_stdout("1\n");
        let code = create_user(
            &admin(&runner),
            CreateUserCommand {
                username: String::from("alice"),
                password: None,
                flags: None,
                skip_existing: true,
            },
        )
        .expect("create user");

        assert_eq!(code, 0);
        assert_eq!(runner.invocations().len(), 1, "only the existence check runs");
    }

    #[rstest]
    fn create_db_creates_missing_database(runner: ScriptedRunner) {
        runner.push_stdout("0\n");
        runner.push_success();
        create_db(
            &admin(&runner),
            CreateDbCommand {
                name: String::from("app"),
                owner: Some(String::from("alice")),
                encoding: None,
                template: String::from("template1"),
                skip_existing: true,
            },
        )
        .expect("create db");

        let commands = runner.remote_commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands.last().map(String::as_str),
            Some("sudo -n -u postgres -- createdb -E UTF-8 -O alice app")
        );
    }

    #[rstest]
    fn report_bool_maps_to_exit_code() {
        assert_eq!(report_bool(true), 0);
        assert_eq!(report_bool(false), 1);
    }

    #[test]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        let err = CliError::Admin(AdminError::Aborted {
            cluster: String::from("main"),
        });
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(
            rendered.contains("dropping the main cluster was aborted by user input"),
            "rendered: {rendered}"
        );
    }
}
