//! MARC21 schema validation and Dublin Core transformation
//!
//! libxml2/libxslt handles are not thread-safe, so one engine thread owns the
//! compiled schema and stylesheet for the whole run. Callers send jobs over a
//! channel and block on the reply; call from blocking contexts only
//! (`spawn_blocking` or plain threads).

use crate::error::{EngineError, ProcessError};
use crate::models::{DublinCoreDocument, MarcDocument};
use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// Validates extracted MARC against the MARC21 slim schema
pub trait MarcSchemaValidator: Send + Sync {
    fn validate(&self, marc: &MarcDocument) -> Result<(), ProcessError>;
}

/// Converts schema-valid MARC into Dublin Core
pub trait DublinCoreTransformer: Send + Sync {
    fn transform(&self, marc: &MarcDocument) -> Result<DublinCoreDocument, ProcessError>;
}

enum Job {
    Validate {
        xml: String,
        reply: mpsc::Sender<Result<(), Vec<String>>>,
    },
    Transform {
        xml: String,
        reply: mpsc::Sender<Result<String, String>>,
    },
}

/// Handle to the engine thread; cheap to share behind an `Arc`
pub struct XmlEngine {
    jobs: Mutex<mpsc::Sender<Job>>,
}

impl XmlEngine {
    /// Compile schema and stylesheet on a new engine thread
    ///
    /// Returns once both are compiled, or with the compilation error.
    pub fn start(schema_path: &Path, stylesheet_path: &Path) -> Result<Self, EngineError> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), EngineError>>();
        let schema_path = schema_path.to_path_buf();
        let stylesheet_path = stylesheet_path.to_path_buf();

        std::thread::Builder::new()
            .name("xml-engine".to_string())
            .spawn(move || run_engine(schema_path, stylesheet_path, job_rx, ready_tx))
            .map_err(|e| EngineError::Thread(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| EngineError::Thread("engine exited during start-up".to_string()))??;

        Ok(Self {
            jobs: Mutex::new(job_tx),
        })
    }

    fn submit<T>(&self, make_job: impl FnOnce(mpsc::Sender<T>) -> Job) -> Option<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        let sender = self.jobs.lock().ok()?.clone();
        sender.send(make_job(reply_tx)).ok()?;
        reply_rx.recv().ok()
    }
}

impl MarcSchemaValidator for XmlEngine {
    fn validate(&self, marc: &MarcDocument) -> Result<(), ProcessError> {
        let xml = marc.xml.clone();
        match self.submit(|reply| Job::Validate { xml, reply }) {
            Some(Ok(())) => Ok(()),
            Some(Err(violations)) => Err(ProcessError::SchemaValidation { violations }),
            None => Err(ProcessError::SchemaValidation {
                violations: vec!["schema engine unavailable".to_string()],
            }),
        }
    }
}

impl DublinCoreTransformer for XmlEngine {
    fn transform(&self, marc: &MarcDocument) -> Result<DublinCoreDocument, ProcessError> {
        let xml = marc.xml.clone();
        match self.submit(|reply| Job::Transform { xml, reply }) {
            Some(Ok(xml)) => Ok(DublinCoreDocument {
                identifier: marc.identifier.clone(),
                xml,
            }),
            Some(Err(message)) => Err(ProcessError::Transform(message)),
            None => Err(ProcessError::Transform("transform engine unavailable".to_string())),
        }
    }
}

fn run_engine(
    schema_path: PathBuf,
    stylesheet_path: PathBuf,
    jobs: mpsc::Receiver<Job>,
    ready: mpsc::Sender<Result<(), EngineError>>,
) {
    let schema_display = schema_path.display().to_string();
    let stylesheet_display = stylesheet_path.display().to_string();

    if !schema_path.is_file() {
        let _ = ready.send(Err(EngineError::Schema {
            path: schema_display,
            message: "file not found".to_string(),
        }));
        return;
    }
    if !stylesheet_path.is_file() {
        let _ = ready.send(Err(EngineError::Stylesheet {
            path: stylesheet_display,
            message: "file not found".to_string(),
        }));
        return;
    }

    let mut schema_parser = SchemaParserContext::from_file(&schema_display);
    let mut validator = match SchemaValidationContext::from_parser(&mut schema_parser) {
        Ok(validator) => validator,
        Err(errors) => {
            let _ = ready.send(Err(EngineError::Schema {
                path: schema_display,
                message: error_messages(&errors).join("; "),
            }));
            return;
        }
    };

    let mut stylesheet = match libxslt::parser::parse_file(&stylesheet_display) {
        Ok(stylesheet) => stylesheet,
        Err(e) => {
            let _ = ready.send(Err(EngineError::Stylesheet {
                path: stylesheet_display,
                message: format!("{:?}", e),
            }));
            return;
        }
    };

    let parser = Parser::default();
    info!(
        schema = %schema_display,
        stylesheet = %stylesheet_display,
        "XML engine ready"
    );
    if ready.send(Ok(())).is_err() {
        return;
    }

    // Ends when every XmlEngine handle is dropped
    for job in jobs {
        match job {
            Job::Validate { xml, reply } => {
                let result = match parser.parse_string(&xml) {
                    Ok(doc) => validator
                        .validate_document(&doc)
                        .map_err(|errors| error_messages(&errors)),
                    Err(e) => Err(vec![format!("not well-formed: {:?}", e)]),
                };
                let _ = reply.send(result);
            }
            Job::Transform { xml, reply } => {
                let result = match parser.parse_string(&xml) {
                    Ok(doc) => stylesheet
                        .transform(doc, Vec::new())
                        .map(|output| output.to_string())
                        .map_err(|e| format!("{:?}", e)),
                    Err(e) => Err(format!("not well-formed: {:?}", e)),
                };
                let _ = reply.send(result);
            }
        }
    }

    debug!("XML engine stopped");
}

fn error_messages(errors: &[libxml::error::StructuredError]) -> Vec<String> {
    errors
        .iter()
        .map(|e| {
            let message = e.message.as_deref().unwrap_or("unknown error").trim();
            match e.line {
                Some(line) => format!("line {}: {}", line, message),
                None => message.to_string(),
            }
        })
        .collect()
}
