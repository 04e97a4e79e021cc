//! Inspector session coordinator.
//!
//! Owns one analyzer, normalizer and highlighter for a document and answers
//! host requests with them. Results that are not replies travel through the
//! [`Transport`] without waiting for delivery.

use ds_analyzer::TreeAnalyzer;
use ds_core::DomspyResult;
use ds_core::SharedLogger;
use ds_dom::HostTree;
use ds_dom::MarkableTree;
use ds_highlight::EventOutcome;
use ds_highlight::HighlightEvent;
use ds_highlight::Highlighter;
use ds_ipc::InboundRequest;
use ds_ipc::OutboundMessage;
use ds_ipc::Response;
use ds_ipc::Transport;
use ds_ipc::decode_request;
use ds_normalize::Normalizer;

mod config;

pub use config::InspectorConfig;
pub use config::MAX_ATTRIBUTE_LEN_ENV;
pub use config::ORDER_ENV;
pub use config::PATH_SEPARATOR_ENV;
pub use config::parse_max_attribute_len;
pub use config::parse_order;

const COMPONENT: &str = "inspector";
const INVALID_TREE: &str = "invalid DOM tree structure";
const UNKNOWN_ACTION: &str = "unknown action";

pub struct Inspector {
    config: InspectorConfig,
    logger: SharedLogger,
    transport: Box<dyn Transport>,
    analyzer: TreeAnalyzer,
    normalizer: Normalizer,
    highlighter: Option<Highlighter>,
}

impl Inspector {
    pub fn new(
        config: InspectorConfig,
        logger: SharedLogger,
        transport: Box<dyn Transport>,
    ) -> DomspyResult<Self> {
        config.validate()?;
        let analyzer = TreeAnalyzer::new(config.analyzer.clone(), logger.clone());
        let normalizer = Normalizer::new(config.normalizer.clone(), logger.clone());

        Ok(Self {
            config,
            logger,
            transport,
            analyzer,
            normalizer,
            highlighter: None,
        })
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.highlighter.is_some()
    }

    pub fn highlighter(&self) -> Option<&Highlighter> {
        self.highlighter.as_ref()
    }

    /// Creates and enables the highlighter. Later calls do nothing.
    pub fn initialize(&mut self) -> &mut Highlighter {
        self.highlighter.get_or_insert_with(|| {
            let mut highlighter =
                Highlighter::new(self.config.highlight.clone(), self.logger.clone());
            highlighter.enable();
            self.logger.info(COMPONENT, "session initialized");
            highlighter
        })
    }

    /// Decodes a JSON request payload and answers it.
    pub fn handle_payload<T: MarkableTree + ?Sized>(
        &mut self,
        tree: &mut T,
        payload: &[u8],
    ) -> Response {
        match decode_request(payload) {
            Ok(request) => self.handle_request(tree, request),
            Err(error) => {
                self.logger
                    .error(COMPONENT, &format!("rejected request: {error}"));
                if error.code == "ipc.request_unknown_action" {
                    Response::failure(UNKNOWN_ACTION)
                } else {
                    Response::failure(error.message)
                }
            }
        }
    }

    pub fn handle_request<T: MarkableTree + ?Sized>(
        &mut self,
        tree: &mut T,
        request: InboundRequest,
    ) -> Response {
        self.initialize();

        match request {
            InboundRequest::GetDomTree => self.capture_dom_structure(&*tree),
            InboundRequest::StartHighlighting => {
                self.initialize().enable();
                Response::ok()
            }
            InboundRequest::StopHighlighting => {
                self.initialize().disable(tree);
                Response::ok()
            }
            InboundRequest::AnalyzeDom { order } => {
                let order = order.unwrap_or(self.config.analyzer.order);
                let data = self.analyzer.analyze_with_order(&*tree, tree.root(), order);
                self.publish(&OutboundMessage::DomAnalysisResult { data });
                Response::ok()
            }
        }
    }

    /// Feeds one pointer or keyboard event to the highlighter.
    ///
    /// Events are ignored until the session has been initialized.
    pub fn handle_input<T: MarkableTree + ?Sized>(
        &mut self,
        tree: &mut T,
        event: HighlightEvent,
    ) -> EventOutcome {
        let Some(highlighter) = self.highlighter.as_mut() else {
            return EventOutcome::default();
        };

        let outcome = highlighter.handle(tree, event);
        if let Some(element) = outcome.selection.clone() {
            self.publish(&OutboundMessage::ElementSelected { element });
        }
        outcome
    }

    /// Clears every highlight when the document goes away.
    pub fn teardown<T: MarkableTree + ?Sized>(&mut self, tree: &mut T) {
        if let Some(highlighter) = self.highlighter.as_mut() {
            highlighter.clear_all_highlights(tree);
            self.logger.debug(COMPONENT, "session torn down");
        }
    }

    fn capture_dom_structure<T: HostTree + ?Sized>(&self, tree: &T) -> Response {
        let root = self.normalizer.analyze_dom(tree);
        if root.children.is_empty() {
            self.logger.error(COMPONENT, INVALID_TREE);
            return Response::failure(INVALID_TREE);
        }
        Response::with_tree(root)
    }

    fn publish(&self, message: &OutboundMessage) {
        if let Err(error) = self.transport.send(message) {
            self.logger.warn(
                COMPONENT,
                &format!("failed to deliver {}: {error}", message.action()),
            );
        }
    }
}
