use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, Write};
use std::time::Duration;

use console::{style, Style};
use serde_json::Value;

use crate::api::types::{Branches, BuildDetail, Commit, Job, State};
use crate::api::Payload;
use crate::warn;
use crate::format::{format_elapsed, format_time};
use crate::reference::Reference;
use crate::table::Table;

pub struct PresentOptions {
    /// Base of the links printed next to builds and jobs.
    pub web_url: String,

    /// Keep only the text after the last carriage return of each log line.
    pub clean_lf: bool,
}

/// Text ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Each line is written followed by a newline.
    Lines(Vec<String>),

    /// Written byte for byte.
    Raw(Vec<u8>),
}

impl Rendered {
    pub fn write_to(&self, w: &mut dyn Write) -> io::Result<()> {
        match self {
            Self::Lines(lines) => {
                for line in lines {
                    writeln!(w, "{line}")?;
                }
            }
            Self::Raw(data) => w.write_all(data)?,
        }
        w.flush()
    }
}

pub fn render(reference: &Reference, payload: &Payload, opts: &PresentOptions) -> Rendered {
    let project_url = format!("{}/{}", opts.web_url, reference.slug());
    match payload {
        Payload::Project(branches) => Rendered::Lines(render_branches(&project_url, branches)),
        Payload::Build(detail) => Rendered::Lines(render_build(&project_url, detail)),
        Payload::Job(log) if opts.clean_lf => Rendered::Raw(clean_lf(log)),
        Payload::Job(log) => Rendered::Raw(log.clone()),
    }
}

fn render_branches(project_url: &str, branches: &Branches) -> Vec<String> {
    let commits: HashMap<u64, &Commit> = branches
        .commits
        .iter()
        .map(|commit| (commit.id, commit))
        .collect();

    let mut table = Table::with_capacity(branches.branches.len());
    for build in branches.branches.iter() {
        let name = match commits.get(&build.commit_id) {
            Some(commit) => quote(&commit.branch),
            None => {
                warn!(
                    "Commit {} of build {} is missing from the response",
                    build.commit_id, build.id
                );
                String::from("?")
            }
        };
        let time = build.finished_at.as_deref().or(build.started_at.as_deref());
        let row = vec![
            format!("#{}", quote(&build.number)),
            name,
            build.state.to_string(),
            format_time(time),
            format!("{project_url}/builds/{}", build.id),
        ];
        let finished = build.finished_at.is_some();
        table.add(row, state_style(finished, build.state, false));
    }
    table.render()
}

fn render_build(project_url: &str, detail: &BuildDetail) -> Vec<String> {
    let build = &detail.build;
    let duration = match build.duration {
        Some(secs) => format_elapsed(Duration::from_secs(secs)),
        None => String::from("-"),
    };

    let mut header = vec![
        format!("#{}", quote(&build.number)),
        build.state.to_string(),
        duration,
    ];
    if let Some(commit) = detail.commit.as_ref() {
        header.push(quote(&commit.branch));
        let sha: String = commit.sha.chars().take(7).collect();
        header.push(quote(&sha));
    }
    header.push(format!("{project_url}/builds/{}", build.id));
    let header = header.join(" ");
    let header = match state_style(build.finished_at.is_some(), build.state, false) {
        Some(style) => style.apply_to(header).to_string(),
        None => style(header).bold().to_string(),
    };

    let mut lines = Vec::with_capacity(detail.jobs.len() + 1);
    lines.push(header);

    let configs = config_diff(&detail.jobs);
    let mut table = Table::with_capacity(detail.jobs.len());
    for (job, config) in detail.jobs.iter().zip(configs) {
        let mut state = job.state.to_string();
        if job.allow_failure {
            state.push_str(" (allowed)");
        }
        let row = vec![
            format!("#{}", quote(&job.number)),
            state,
            config,
            format!("{project_url}/jobs/{}", job.id),
        ];
        let finished = job.finished_at.is_some() || is_final(job.state);
        table.add(row, state_style(finished, job.state, job.allow_failure));
    }
    lines.extend(table.render());
    lines
}

fn is_final(state: State) -> bool {
    matches!(
        state,
        State::Passed | State::Failed | State::Errored | State::Canceled
    )
}

/// Yellow while running, bold red once finished without passing.
fn state_style(finished: bool, state: State, allow_failure: bool) -> Option<Style> {
    if !finished {
        return Some(Style::new().yellow());
    }
    match state {
        State::Passed => None,
        _ if allow_failure => Some(Style::new().yellow()),
        _ => Some(Style::new().red().bold()),
    }
}

/// For every job, the `key=value` pairs of its config that tell it apart from
/// the other jobs of the build. Only scalar values are compared, as JSON, so
/// `"3.5"` and `3.5` differ; keys starting with `.` are internal to Travis.
fn config_diff(jobs: &[Job]) -> Vec<String> {
    let mut values: HashMap<&str, HashSet<String>> = HashMap::new();
    for job in jobs {
        for (key, value) in job.config.iter() {
            if scalar(value).is_some() {
                values.entry(key.as_str()).or_default().insert(value.to_string());
            }
        }
    }

    jobs.iter()
        .map(|job| {
            let sorted: BTreeMap<&str, &Value> = job
                .config
                .iter()
                .map(|(key, value)| (key.as_str(), value))
                .collect();
            let mut parts = Vec::new();
            for (key, value) in sorted {
                if key.starts_with('.') {
                    continue;
                }
                let Some(value) = scalar(value) else {
                    continue;
                };
                if values.get(key).map(|set| set.len()).unwrap_or_default() <= 1 {
                    continue;
                }
                parts.push(format!("{}={}", quote(key), quote(&value)));
            }
            parts.join(" ")
        })
        .collect()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) | Value::Object(_) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Keep what a terminal would finally show on each line: the text after the
/// last carriage return. Bytes are left as they are otherwise.
fn clean_lf(log: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(log.len());
    for line in log.split_inclusive(|b| *b == b'\n') {
        let end = line
            .iter()
            .rposition(|b| !matches!(b, b'\r' | b'\n'))
            .map_or(0, |pos| pos + 1);
        let line = &line[..end];
        let line = line.rsplit(|b| *b == b'\r').next().unwrap_or(line);
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    out
}

fn is_unsafe(ch: char) -> bool {
    matches!(ch, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

/// Make text from the API safe to print: control characters are shown in
/// reverse video instead of being sent to the terminal.
fn quote(s: &str) -> String {
    if !s.chars().any(is_unsafe) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        if !is_unsafe(ch) {
            out.push(ch);
            continue;
        }
        let shown = match ch {
            '\t' => String::from("\t"),
            '\u{0}'..='\u{1f}' | '\u{7f}' => format!("^{}", char::from(ch as u8 ^ 0x40)),
            _ => format!("<U+{:04X}>", ch as u32),
        };
        out.push_str(&style(shown).reverse().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::api::types::Build;
    use crate::reference::Resource;

    use super::*;

    fn reference(resource: Resource) -> Reference {
        Reference {
            host: String::from("travis-ci.org"),
            owner: String::from("jwilk"),
            repo: String::from("trava"),
            resource,
        }
    }

    fn options(clean_lf: bool) -> PresentOptions {
        PresentOptions {
            web_url: String::from("https://travis-ci.org"),
            clean_lf,
        }
    }

    fn plain_lines(rendered: Rendered) -> Vec<String> {
        match rendered {
            Rendered::Lines(lines) => lines
                .iter()
                .map(|line| console::strip_ansi_codes(line).into_owned())
                .collect(),
            Rendered::Raw(data) => panic!("unexpected raw output {data:?}"),
        }
    }

    fn job(id: u64, number: &str, state: State, config: Value) -> Job {
        let Value::Object(config) = config else {
            panic!("config should be an object");
        };
        Job {
            id,
            number: number.to_string(),
            state,
            config,
            finished_at: Some(String::from("2016-03-01T10:03:00Z")),
            allow_failure: false,
        }
    }

    #[test]
    fn test_branches() {
        let data = r#"{
            "branches": [
                {"id": 100, "commit_id": 5, "number": "42", "state": "passed",
                 "finished_at": "2016-03-01T10:02:00Z"},
                {"id": 103, "commit_id": 6, "number": "43", "state": "started",
                 "started_at": "2016-03-02T10:00:00Z", "finished_at": null},
                {"id": 104, "commit_id": 99, "number": "44", "state": "failed",
                 "finished_at": "2016-03-03T10:00:00Z"}
            ],
            "commits": [
                {"id": 5, "branch": "main"},
                {"id": 6, "branch": "wip"}
            ]
        }"#;
        let branches: Branches = serde_json::from_str(data).unwrap();
        let payload = Payload::Project(branches);

        let lines = plain_lines(render(&reference(Resource::Project), &payload, &options(false)));
        assert_eq!(lines.len(), 3);

        assert!(lines[0].starts_with("#42"));
        for word in ["main", "42", "passed", "https://travis-ci.org/jwilk/trava/builds/100"] {
            assert!(lines[0].contains(word), "{word} not in {:?}", lines[0]);
        }
        for word in ["wip", "43", "started", "2016-03-0"] {
            assert!(lines[1].contains(word), "{word} not in {:?}", lines[1]);
        }
        assert!(lines[2].contains(" ? "));
        assert!(lines[2].contains("failed"));
    }

    #[test]
    fn test_empty_branches() {
        let payload = Payload::Project(Branches {
            branches: vec![],
            commits: vec![],
        });
        let rendered = render(&reference(Resource::Project), &payload, &options(false));
        assert_eq!(rendered, Rendered::Lines(vec![]));
    }

    #[test]
    fn test_build() {
        let mut allowed = job(3, "42.3", State::Failed, json!({"python": "nightly"}));
        allowed.allow_failure = true;
        let payload = Payload::Build(BuildDetail {
            build: Build {
                id: 100,
                number: String::from("42"),
                state: State::Failed,
                duration: Some(90),
                finished_at: Some(String::from("2016-03-01T10:05:00Z")),
            },
            commit: Some(Commit {
                id: 5,
                branch: String::from("main"),
                sha: String::from("abcdef0123456"),
            }),
            jobs: vec![
                job(
                    1,
                    "42.1",
                    State::Passed,
                    json!({"python": "3.5", "os": "linux", "env": ["A=1"], ".result": "configured"}),
                ),
                job(2, "42.2", State::Failed, json!({"python": "3.6", "os": "linux"})),
                allowed,
            ],
        });

        let lines = plain_lines(render(
            &reference(Resource::Build(String::from("100"))),
            &payload,
            &options(false),
        ));
        assert_eq!(
            lines,
            vec![
                "#42 failed 1.50min main abcdef0 https://travis-ci.org/jwilk/trava/builds/100",
                "#42.1  passed            python=3.5      https://travis-ci.org/jwilk/trava/jobs/1",
                "#42.2  failed            python=3.6      https://travis-ci.org/jwilk/trava/jobs/2",
                "#42.3  failed (allowed)  python=nightly  https://travis-ci.org/jwilk/trava/jobs/3",
            ]
        );
    }

    #[test]
    fn test_job() {
        let payload = Payload::Job(b"hello\nworld\n".to_vec());
        let rendered = render(
            &reference(Resource::Job(String::from("456"))),
            &payload,
            &options(false),
        );
        assert_eq!(rendered, Rendered::Raw(b"hello\nworld\n".to_vec()));

        let mut out = Vec::new();
        rendered.write_to(&mut out).unwrap();
        assert_eq!(out, b"hello\nworld\n");
    }

    #[test]
    fn test_job_clean_lf() {
        let payload = Payload::Job(b"a\r\nprogress 10%\rprogress 100%\r\nlast".to_vec());
        let rendered = render(
            &reference(Resource::Job(String::from("1"))),
            &payload,
            &options(true),
        );
        assert_eq!(
            rendered,
            Rendered::Raw(b"a\nprogress 100%\nlast\n".to_vec())
        );
    }

    #[test]
    fn test_job_bytes() {
        let log = b"\xef\xbb\xbfstart \xff\xfe end\r\n\x1b[31mred\x1b[0m\n".to_vec();
        let job = reference(Resource::Job(String::from("7")));

        let rendered = render(&job, &Payload::Job(log.clone()), &options(false));
        let mut out = Vec::new();
        rendered.write_to(&mut out).unwrap();
        assert_eq!(out, log);

        let rendered = render(&job, &Payload::Job(log), &options(true));
        assert_eq!(
            rendered,
            Rendered::Raw(b"\xef\xbb\xbfstart \xff\xfe end\n\x1b[31mred\x1b[0m\n".to_vec())
        );
    }

    #[test]
    fn test_config_diff_types() {
        let jobs = vec![
            job(1, "1.1", State::Passed, json!({"python": "3.5", "sudo": false})),
            job(2, "1.2", State::Passed, json!({"python": 3.5, "sudo": false})),
        ];
        assert_eq!(config_diff(&jobs), vec!["python=3.5", "python=3.5"]);

        let jobs = vec![
            job(1, "1.1", State::Passed, json!({"python": "3.5"})),
            job(2, "1.2", State::Passed, json!({"python": "3.5"})),
        ];
        assert_eq!(config_diff(&jobs), vec!["", ""]);
    }

    #[test]
    fn test_build_quotes_api_fields() {
        let payload = Payload::Build(BuildDetail {
            build: Build {
                id: 1,
                number: String::from("4\u{1b}[2J"),
                state: State::Passed,
                duration: None,
                finished_at: Some(String::from("2016-03-01T10:05:00Z")),
            },
            commit: Some(Commit {
                id: 5,
                branch: String::from("main"),
                sha: String::from("ab\u{7}cdef0123"),
            }),
            jobs: vec![job(2, "4.1\u{1b}", State::Passed, json!({}))],
        });

        let rendered = render(
            &reference(Resource::Build(String::from("1"))),
            &payload,
            &options(false),
        );
        let Rendered::Lines(raw) = &rendered else {
            panic!("unexpected raw output");
        };
        for line in raw {
            assert!(!line.contains("\u{1b}[2J"), "{line:?}");
            assert!(!line.contains("\u{1b}\u{20}"), "{line:?}");
            assert!(!line.contains('\u{7}'), "{line:?}");
        }
        assert_eq!(
            plain_lines(rendered),
            vec![
                "#4^[[2J passed - main ab^Gcdef https://travis-ci.org/jwilk/trava/builds/1",
                "#4.1^[  passed    https://travis-ci.org/jwilk/trava/jobs/2",
            ]
        );
    }

    #[test]
    fn test_write_lines() {
        let rendered = Rendered::Lines(vec![String::from("one"), String::from("two")]);
        let mut out = Vec::new();
        rendered.write_to(&mut out).unwrap();
        assert_eq!(out, b"one\ntwo\n");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("main"), "main");
        assert_eq!(console::strip_ansi_codes(&quote("a\u{1b}[31mb")), "a^[[31mb");
        assert_eq!(console::strip_ansi_codes(&quote("x\u{7f}")), "x^?");
        assert_eq!(console::strip_ansi_codes(&quote("x\u{85}")), "x<U+0085>");
        assert_eq!(console::strip_ansi_codes(&quote("a\tb")), "a\tb");
    }
}
