use std::sync::Arc;

use anyhow::{Context, Result, bail};
use authz_console_client::{ApiClient, ClientConfig, CollectionFetcher, SignInRequest};
use authz_console_core::model::{
    Action, Audit, CheckRequest, Client, Policy, Principal, Resource, Role, User,
};
use authz_console_core::{Candidate, Entity};
use authz_console_view::{
    CollectionView, ConfirmationGate, ConfirmationRequest, DeleteOutcome, DeleteSubject, Severity, ToastQueue,
    confirm_and_delete,
};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::args::{CheckArgs, Cli, Collection, Command, DeleteArgs, ListArgs, SigninArgs};

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(url) = cli.api_url {
        config = ClientConfig {
            api_url: ClientConfig::new(url).api_url,
            ..config
        };
    }

    let client = ApiClient::new(&config).context("failed to build API client")?;
    tracing::debug!(api_url = client.base_url(), "client ready");

    match cli.command {
        Command::Signin(args) => signin(&client, args).await,
        Command::List(args) => match args.collection {
            Collection::Actions => list::<Action>(client, args).await,
            Collection::Audits => list::<Audit>(client, args).await,
            Collection::Clients => list::<Client>(client, args).await,
            Collection::Policies => list::<Policy>(client, args).await,
            Collection::Principals => list::<Principal>(client, args).await,
            Collection::Resources => list::<Resource>(client, args).await,
            Collection::Roles => list::<Role>(client, args).await,
            Collection::Users => list::<User>(client, args).await,
        },
        Command::Check(args) => check(&client, args).await,
        Command::Delete(args) => match args.collection {
            Collection::Actions => delete::<Action>(client, args).await,
            Collection::Audits => bail!("audit entries cannot be deleted"),
            Collection::Clients => delete::<Client>(client, args).await,
            Collection::Policies => delete::<Policy>(client, args).await,
            Collection::Principals => delete::<Principal>(client, args).await,
            Collection::Resources => delete::<Resource>(client, args).await,
            Collection::Roles => delete::<Role>(client, args).await,
            Collection::Users => delete::<User>(client, args).await,
        },
        Command::Stats => stats(&client).await,
    }
}

async fn signin(client: &ApiClient, args: SigninArgs) -> Result<()> {
    let auth = client
        .sign_in(&SignInRequest::new(args.username, args.password))
        .await
        .context("sign-in failed")?;

    print_json(&auth)
}

async fn list<E>(client: ApiClient, args: ListArgs) -> Result<()>
where
    E: Entity + Serialize + Clone,
{
    let toasts = Arc::new(ToastQueue::new());
    let view: CollectionView<E> = CollectionView::new(Arc::new(CollectionFetcher::<E>::new(client)), toasts.clone())
        .with_page(args.page)
        .with_page_size(args.size)
        .with_filter(args.filter)
        .with_sort(args.sort)
        .with_forced_sort(forced_sort::<E>());

    view.load().await;
    report(&toasts)?;

    let state = view.snapshot();
    print_json(&serde_json::json!({
        "total": state.total,
        "page": state.page,
        "size": state.size,
        "data": state.rows,
    }))
}

/// The audit log is always shown newest first.
fn forced_sort<E: Entity>() -> Option<authz_console_core::SortSpec> {
    (E::COLLECTION == Audit::COLLECTION).then(|| authz_console_core::SortSpec::desc("date"))
}

async fn check(client: &ApiClient, args: CheckArgs) -> Result<()> {
    let resource = client
        .get::<Resource>(&args.resource)
        .await
        .with_context(|| format!("unknown resource {}", args.resource))?;

    let request = CheckRequest::from_selection(
        &Candidate::from_id(args.principal),
        &resource.to_candidate(),
        &Candidate::from_id(args.action),
    );
    let response = client.check(&request).await.context("check failed")?;

    match response.first_allowed() {
        Some(true) => println!("allowed"),
        Some(false) => println!("denied"),
        None => bail!("backend returned no check result"),
    }
    Ok(())
}

async fn delete<E>(client: ApiClient, args: DeleteArgs) -> Result<()>
where
    E: Entity + Clone,
{
    let toasts = Arc::new(ToastQueue::new());
    let view: CollectionView<E> =
        CollectionView::new(Arc::new(CollectionFetcher::<E>::new(client.clone())), toasts.clone());
    let gate = ConfirmationGate::new();
    let subject = DeleteSubject::of::<E>(args.id.clone());

    let (outcome, prompt) = tokio::join!(
        confirm_and_delete(&gate, toasts.as_ref(), &view, &subject, || client.delete::<E>(&args.id)),
        answer(&gate, args.yes, BufReader::new(tokio::io::stdin()), tokio::io::stdout()),
    );
    prompt?;

    for toast in toasts.drain() {
        match toast.severity {
            Severity::Error | Severity::Warning => eprintln!("{}", toast.message),
            Severity::Info | Severity::Success => println!("{}", toast.message),
        }
    }

    match outcome {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::Cancelled => {
            println!("cancelled");
            Ok(())
        }
        DeleteOutcome::NotDeleted => bail!("{} {} was not deleted", subject.noun, subject.id),
        DeleteOutcome::Failed(err) => Err(err).context("delete failed"),
    }
}

/// Answers the gate's pending request from `input`, or accepts it outright.
///
/// The gate is resolved on every path, errors included.
async fn answer<R, W>(gate: &ConfirmationGate, assume_yes: bool, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let request = gate.requested().await;

    if assume_yes {
        gate.accept();
        return Ok(());
    }

    match prompt(&request, input, output).await {
        Ok(Some(true)) => gate.accept(),
        Ok(Some(false)) => gate.cancel(),
        Ok(None) => gate.dismiss(),
        Err(err) => {
            gate.dismiss();
            return Err(err);
        }
    };
    Ok(())
}

/// `None` when the input closes before a line is read.
async fn prompt<R, W>(request: &ConfirmationRequest, mut input: R, mut output: W) -> Result<Option<bool>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ConfirmationRequest { title, message } = request;
    output
        .write_all(format!("{title}\n{message} [y/N] ").as_bytes())
        .await
        .context("failed to write confirmation prompt")?;
    output.flush().await.context("failed to write confirmation prompt")?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .await
        .context("failed to read confirmation")?;

    Ok((read > 0).then(|| is_yes(&line)))
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn stats(client: &ApiClient) -> Result<()> {
    let days = client.stats().await.context("failed to load stats")?;
    print_json(&days)
}

fn report(toasts: &ToastQueue) -> Result<()> {
    let errors: Vec<String> = toasts
        .drain()
        .into_iter()
        .filter(|t| t.severity == Severity::Error)
        .map(|t| t.message)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        bail!(errors.join("; "))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use authz_console_view::Notifier;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(self: Pin<&mut Self>, _: &mut TaskContext<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn unwritable_prompt_dismisses_the_gate() {
        let gate = ConfirmationGate::new();

        let (confirmed, answered) = tokio::join!(
            gate.confirm("Delete confirmation", "Do you really want to delete role admin?"),
            answer(&gate, false, &b"y\n"[..], BrokenPipe),
        );

        assert!(!confirmed);
        assert!(answered.is_err());
        assert!(gate.pending().is_none());
    }

    #[tokio::test]
    async fn typed_answer_resolves_the_gate() {
        let gate = ConfirmationGate::new();
        let mut shown = Vec::new();

        let (confirmed, answered) = tokio::join!(
            gate.confirm("Delete confirmation", "Do you really want to delete role admin?"),
            answer(&gate, false, &b"yes\n"[..], &mut shown),
        );
        assert!(confirmed);
        answered.unwrap();
        assert_eq!(
            String::from_utf8(shown).unwrap(),
            "Delete confirmation\nDo you really want to delete role admin? [y/N] "
        );

        let (confirmed, answered) = tokio::join!(gate.confirm("t", "m"), answer(&gate, false, &b""[..], Vec::new()));
        assert!(!confirmed);
        answered.unwrap();
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[test]
    fn load_errors_fail_the_command() {
        let toasts = ToastQueue::new();
        toasts.info("loaded");
        assert!(report(&toasts).is_ok());

        toasts.error("unable to load data: connection refused");
        let err = report(&toasts).unwrap_err();
        assert_eq!(err.to_string(), "unable to load data: connection refused");
    }

    #[test]
    fn audits_are_forced_newest_first() {
        assert_eq!(forced_sort::<Audit>(), Some(authz_console_core::SortSpec::desc("date")));
        assert_eq!(forced_sort::<Role>(), None);
    }
}
