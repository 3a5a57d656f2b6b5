//! Command-line argument dispatch.
//!
//! This module maps validated CLI matches to the action the binary executes.

use crate::cli::{
    actions::{prefs, route, session, Action},
    commands::{
        prefs::{ARG_LANGUAGE, ARG_THEME, ARG_TOGGLE_THEME, CMD_PREFS},
        route::{ARG_ON_DENY, ARG_PATH, ARG_RESET, ARG_ROLES, CMD_CHECK},
        session::{
            ARG_EMAIL, ARG_IDENTIFIER, ARG_NAME, ARG_PASSWORD, CMD_LOGIN, CMD_LOGOUT,
            CMD_REGISTER, CMD_STATUS, CMD_WHOAMI,
        },
    },
    globals::GlobalArgs,
};
use crate::features::auth::{DenyBehavior, Role};
use crate::preferences::{Language, Theme};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the command is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let Some((name, sub_m)) = matches.subcommand() else {
        return Err(anyhow!("missing command"));
    };
    let globals = GlobalArgs::parse(sub_m);

    match name {
        CMD_LOGIN => Ok(Action::Login(session::LoginArgs {
            globals,
            identifier: required(sub_m, ARG_IDENTIFIER)?,
            password: SecretString::from(required(sub_m, ARG_PASSWORD)?),
        })),
        CMD_REGISTER => Ok(Action::Register(session::RegisterArgs {
            globals,
            name: required(sub_m, ARG_NAME)?,
            identifier: required(sub_m, ARG_IDENTIFIER)?,
            email: sub_m.get_one::<String>(ARG_EMAIL).cloned(),
            password: SecretString::from(required(sub_m, ARG_PASSWORD)?),
        })),
        CMD_LOGOUT => Ok(Action::Logout(globals)),
        CMD_WHOAMI => Ok(Action::Whoami(globals)),
        CMD_STATUS => Ok(Action::Status(globals)),
        CMD_CHECK => Ok(Action::Check(route::Args {
            globals,
            path: required(sub_m, ARG_PATH)?,
            roles: sub_m
                .get_many::<Role>(ARG_ROLES)
                .map(|roles| roles.copied().collect())
                .unwrap_or_default(),
            on_deny: sub_m
                .get_one::<DenyBehavior>(ARG_ON_DENY)
                .copied()
                .unwrap_or_default(),
            reset: sub_m.get_flag(ARG_RESET),
        })),
        CMD_PREFS => Ok(Action::Prefs(prefs::Args {
            globals,
            theme: sub_m.get_one::<Theme>(ARG_THEME).copied(),
            language: sub_m.get_one::<Language>(ARG_LANGUAGE).copied(),
            toggle_theme: sub_m.get_flag(ARG_TOGGLE_THEME),
        })),
        other => Err(anyhow!("unknown command: {other}")),
    }
}
