//! Line-oriented front end over the stores.

use std::io::{self, Write};

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use formhelper_frontend::models::{
    FileDraft, FileId, PersonId, RecordId, RecordScope, TableRecord,
};
use formhelper_frontend::{AppStores, FetchOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub enum LoopAction {
    Continue,
    Exit,
}

pub struct Shell<W: Write> {
    stores: AppStores,
    out: W,
}

/// Runs the interactive loop on stdin/stdout until `quit` or end of input.
pub async fn run(stores: AppStores) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut shell = Shell::new(stores, io::stdout());
    shell.run(stdin).await
}

impl<W: Write> Shell<W> {
    pub fn new(stores: AppStores, out: W) -> Self {
        Self { stores, out }
    }

    pub fn stores(&self) -> &AppStores {
        &self.stores
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, mut reader: R) -> Result<()> {
        writeln!(self.out, "Formhelper ready. Type 'help' for a list of commands.")?;
        loop {
            write!(self.out, "formhelper> ")?;
            self.out.flush()?;

            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                writeln!(self.out, "Exiting")?;
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let tokens = match shell_words::split(trimmed) {
                Ok(tokens) if !tokens.is_empty() => tokens,
                Ok(_) => continue,
                Err(err) => {
                    writeln!(self.out, "Unable to parse command: {err}")?;
                    continue;
                }
            };

            match self.handle_command(&tokens).await {
                Ok(LoopAction::Continue) => {}
                Ok(LoopAction::Exit) => break,
                Err(err) => writeln!(self.out, "Error: {err:#}")?,
            }
        }
        Ok(())
    }

    pub async fn handle_command(&mut self, tokens: &[String]) -> Result<LoopAction> {
        let (command, args) = tokens
            .split_first()
            .ok_or_else(|| anyhow!("Empty command. Type 'help'."))?;
        match command.as_str() {
            "help" => self.print_help()?,
            "persons" | "people" => self.list_persons()?,
            "add-person" => {
                let name = join_required(args, "add-person <name>")?;
                let id = self.stores.persons.create(&name).await?;
                writeln!(self.out, "Created person #{id}")?;
            }
            "rename-person" => {
                let id = PersonId(parse_id(args.first(), "rename-person <id> <name>")?);
                let name = join_required(&args[1..], "rename-person <id> <name>")?;
                self.stores.persons.update(id, &name).await?;
                writeln!(self.out, "Renamed person #{id}")?;
            }
            "delete-person" => {
                let id = PersonId(parse_id(args.first(), "delete-person <id>")?);
                self.stores.persons.delete(id).await?;
                let kept = self.stores.files.files_for_person(id).len();
                writeln!(self.out, "Deleted person #{id}")?;
                if kept > 0 {
                    writeln!(self.out, "{kept} file(s) still reference #{id}")?;
                }
            }
            "files" => {
                let filter = match args.first() {
                    Some(raw) => Some(PersonId(parse_id(Some(raw), "files [person-id]")?)),
                    None => None,
                };
                self.list_files(filter)?;
            }
            "add-file" => {
                let draft = parse_draft(args, "add-file <name> <path> <type> [person-id]")?;
                let id = self.stores.files.create(&draft).await?;
                writeln!(self.out, "Added file #{id}")?;
            }
            "update-file" => {
                let usage = "update-file <id> <name> <path> <type> [person-id]";
                let id = FileId(parse_id(args.first(), usage)?);
                let draft = parse_draft(&args[1..], usage)?;
                self.stores.files.update(id, &draft).await?;
                writeln!(self.out, "Updated file #{id}")?;
            }
            "delete-file" => {
                let id = FileId(parse_id(args.first(), "delete-file <id>")?);
                self.stores.files.delete(id).await?;
                writeln!(self.out, "Deleted file #{id}")?;
            }
            "records" => {
                if let Some(scope) = parse_scope(args)? {
                    let outcome = self.stores.records.set_scope(scope).await;
                    self.report_fetch("records", &outcome)?;
                }
                self.list_records()?;
            }
            "add-record" => {
                let usage = "add-record <file-id> <json> [person-id]";
                let file = FileId(parse_id(args.first(), usage)?);
                let content = args.get(1).ok_or_else(|| anyhow!("Usage: {usage}"))?;
                let person = match args.get(2) {
                    Some(raw) => Some(PersonId(parse_id(Some(raw), usage)?)),
                    None => None,
                };
                let id = self.stores.records.create(file, person, content).await?;
                writeln!(self.out, "Added record #{id}")?;
            }
            "edit-record" => {
                let usage = "edit-record <id> <json>";
                let id = RecordId(parse_id(args.first(), usage)?);
                let content = args.get(1).ok_or_else(|| anyhow!("Usage: {usage}"))?;
                self.stores.records.update(id, content).await?;
                writeln!(self.out, "Updated record #{id}")?;
            }
            "delete-record" => {
                let id = RecordId(parse_id(args.first(), "delete-record <id>")?);
                self.stores.records.delete(id).await?;
                writeln!(self.out, "Deleted record #{id}")?;
            }
            "export-csv" => {
                let usage = "export-csv <person-id> <path>";
                let person = PersonId(parse_id(args.first(), usage)?);
                let path = args.get(1).ok_or_else(|| anyhow!("Usage: {usage}"))?;
                let exported = self.stores.records.export_csv(person, Path::new(path)).await?;
                writeln!(self.out, "Exported {exported} record(s) to {path}")?;
            }
            "refresh" => {
                let loaded = self.stores.preload().await;
                self.report_fetch("persons", &loaded.persons)?;
                self.report_fetch("files", &loaded.files)?;
                self.report_fetch("records", &loaded.records)?;
            }
            "language" => match args.first() {
                Some(code) => {
                    self.stores.settings.set_language(code)?;
                    writeln!(self.out, "Language set to {code}")?;
                }
                None => writeln!(self.out, "{}", self.stores.settings.language())?,
            },
            "theme" => {
                let dark = self.stores.settings.toggle_theme();
                writeln!(self.out, "Theme: {}", if dark { "dark" } else { "light" })?;
            }
            "quit" | "exit" => return Ok(LoopAction::Exit),
            other => writeln!(self.out, "Unknown command '{other}'. Type 'help'.")?,
        }
        Ok(LoopAction::Continue)
    }

    pub fn report_fetch(&mut self, label: &str, outcome: &FetchOutcome) -> io::Result<()> {
        match outcome {
            FetchOutcome::Refreshed { count } => writeln!(self.out, "Loaded {count} {label}"),
            FetchOutcome::Stale { error } => {
                writeln!(self.out, "Could not load {label} ({error}); showing last known list")
            }
        }
    }

    fn list_persons(&mut self) -> io::Result<()> {
        let persons = self.stores.persons.persons();
        if persons.is_empty() {
            return writeln!(self.out, "No persons");
        }
        for person in persons {
            writeln!(
                self.out,
                "#{:<5} {:<24} updated {}",
                person.id, person.name, person.updated_at
            )?;
        }
        writeln!(self.out, "{} person(s)", self.stores.persons.count())
    }

    fn list_files(&mut self, filter: Option<PersonId>) -> io::Result<()> {
        let files = match filter {
            Some(person) => self.stores.files.files_for_person(person),
            None => self.stores.files.files(),
        };
        if files.is_empty() {
            return writeln!(self.out, "No files");
        }
        for file in &files {
            let owner = self.person_label(file.person_id);
            writeln!(
                self.out,
                "#{:<5} {:<24} [{}] {}  owner: {}",
                file.id, file.file_name, file.file_type, file.file_path, owner
            )?;
        }
        writeln!(self.out, "{} file(s)", files.len())
    }

    fn list_records(&mut self) -> io::Result<()> {
        let records = self.stores.records.records();
        if records.is_empty() {
            return writeln!(self.out, "No records");
        }
        for record in &records {
            let owner = self.person_label(record.person_id);
            writeln!(
                self.out,
                "#{:<5} file #{:<5} {:<12} owner: {}",
                record.id,
                record.file_id,
                table_shape(record),
                owner
            )?;
        }
        writeln!(self.out, "{} record(s)", records.len())
    }

    fn person_label(&self, person_id: Option<PersonId>) -> String {
        match person_id {
            None => "-".to_string(),
            Some(id) => match self.stores.persons.get(id) {
                Some(person) => person.name,
                None => format!("#{id} (unknown)"),
            },
        }
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.out, "Commands:")?;
        writeln!(self.out, "  persons                              list persons")?;
        writeln!(self.out, "  add-person <name>                    create a person")?;
        writeln!(self.out, "  rename-person <id> <name>            rename a person")?;
        writeln!(self.out, "  delete-person <id>                   delete a person")?;
        writeln!(self.out, "  files [person-id]                    list files")?;
        writeln!(self.out, "  add-file <name> <path> <type> [pid]  register a file")?;
        writeln!(self.out, "  update-file <id> <name> <path> <type> [pid]  edit a file")?;
        writeln!(self.out, "  delete-file <id>                     delete a file")?;
        writeln!(self.out, "  records [all|file <id>|person <id>]  list table records")?;
        writeln!(self.out, "  add-record <file-id> <json> [pid]    store a table")?;
        writeln!(self.out, "  edit-record <id> <json>              replace a table")?;
        writeln!(self.out, "  delete-record <id>                   delete a table")?;
        writeln!(self.out, "  export-csv <person-id> <path>        export a person's tables")?;
        writeln!(self.out, "  refresh                              reload every list")?;
        writeln!(self.out, "  language [code]                      show or set language")?;
        writeln!(self.out, "  theme                                toggle dark theme")?;
        writeln!(self.out, "  quit                                 exit")
    }
}

fn parse_id(raw: Option<&String>, usage: &str) -> Result<i64> {
    let raw = raw.ok_or_else(|| anyhow!("Usage: {usage}"))?;
    raw.trim_start_matches('#')
        .parse::<i64>()
        .with_context(|| format!("'{raw}' is not a valid id"))
}

fn parse_draft(args: &[String], usage: &str) -> Result<FileDraft> {
    if args.len() < 3 {
        return Err(anyhow!("Usage: {usage}"));
    }
    let mut draft = FileDraft::new(&args[0], &args[1], &args[2]);
    if let Some(raw) = args.get(3) {
        draft = draft.for_person(PersonId(parse_id(Some(raw), usage)?));
    }
    Ok(draft)
}

fn parse_scope(args: &[String]) -> Result<Option<RecordScope>> {
    let usage = "records [all|file <id>|person <id>]";
    match args.first().map(String::as_str) {
        None => Ok(None),
        Some("all") => Ok(Some(RecordScope::All)),
        Some("file") => {
            let id = FileId(parse_id(args.get(1), usage)?);
            Ok(Some(RecordScope::File(id)))
        }
        Some("person") => {
            let id = PersonId(parse_id(args.get(1), usage)?);
            Ok(Some(RecordScope::Person(id)))
        }
        Some(_) => Err(anyhow!("Usage: {usage}")),
    }
}

fn table_shape(record: &TableRecord) -> String {
    match record.table() {
        Some(table) => format!("{}x{} table", table.rows.len(), table.column_count()),
        None => "unreadable".to_string(),
    }
}

fn join_required(args: &[String], usage: &str) -> Result<String> {
    if args.is_empty() {
        return Err(anyhow!("Usage: {usage}"));
    }
    Ok(args.join(" "))
}
