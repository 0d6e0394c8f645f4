//! Host DOM Locator
//!
//! Finds the host's conversation sidebar and the "new chat" control next to
//! which the panel is mounted. The host publishes no DOM contract, so the
//! lookup is an ordered list of strategies, each returning an optional
//! container; the first hit wins and is cached for the next pass.

use crate::dom::HostDom;
use indexmap::IndexMap;
use shared::config::{IdentitySection, LocatorSection};
use shared::{AttrFilter, ChatId, EngineConfig, Query, conversation_chat_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// Container found on a previous pass, still connected and populated.
    Cached,
    /// Configured structural queries.
    Direct,
    /// Nearest landmark or scroll container above the first conversation link.
    LinkLandmark,
    /// Parent of the first conversation link.
    LinkParent,
}

/// Strategies in priority order.
pub const STRATEGIES: [LocateStrategy; 4] = [
    LocateStrategy::Cached,
    LocateStrategy::Direct,
    LocateStrategy::LinkLandmark,
    LocateStrategy::LinkParent,
];

#[derive(Debug, Clone, PartialEq)]
pub struct NavLocation<N> {
    pub container: N,
    pub new_chat_anchor: Option<N>,
    pub strategy: LocateStrategy,
}

/// A host link pointing at a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationLink<N> {
    pub node: N,
    pub chat: ChatId,
    pub path: String,
}

/// What the host sidebar shows for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScrapedChat {
    pub title: String,
    pub path: String,
}

pub struct HostLocator<N> {
    identity: IdentitySection,
    locator: LocatorSection,
    cached: Option<N>,
    last_strategy: Option<LocateStrategy>,
}

impl<N: Clone + PartialEq + std::fmt::Debug> HostLocator<N> {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            identity: config.identity.clone(),
            locator: config.locator.clone(),
            cached: None,
            last_strategy: None,
        }
    }

    /// Run the strategies in order. Returns `None` while the host has not
    /// rendered its navigation yet; callers retry on the next trigger.
    pub fn locate<D: HostDom<Node = N>>(&mut self, dom: &D) -> Option<NavLocation<N>> {
        for strategy in STRATEGIES {
            let Some(container) = self.run(strategy, dom) else {
                continue;
            };
            if self.last_strategy != Some(strategy) && strategy != LocateStrategy::Cached {
                log::debug!("🧭 Navigation container located via {strategy:?}");
            }
            self.last_strategy = Some(strategy);
            self.cached = Some(container.clone());
            let new_chat_anchor = self.new_chat_anchor(dom, &container);
            return Some(NavLocation {
                container,
                new_chat_anchor,
                strategy,
            });
        }

        if self.last_strategy.take().is_some() {
            log::debug!("🧭 Navigation container lost");
        }
        self.cached = None;
        None
    }

    pub fn forget(&mut self) {
        self.cached = None;
        self.last_strategy = None;
    }

    pub fn run<D: HostDom<Node = N>>(&self, strategy: LocateStrategy, dom: &D) -> Option<N> {
        match strategy {
            LocateStrategy::Cached => self.cached.clone().filter(|container| {
                dom.is_connected(container) && self.has_conversation_link(dom, container)
            }),
            LocateStrategy::Direct => self.locator.direct_containers.iter().find_map(|query| {
                dom.query(None, query).into_iter().find(|candidate| {
                    !dom.is_inside_panel(candidate) && self.has_conversation_link(dom, candidate)
                })
            }),
            LocateStrategy::LinkLandmark => {
                let link = self.conversation_links(dom, None).into_iter().next()?;
                dom.ancestors(&link.node)
                    .into_iter()
                    .find(|ancestor| self.is_landmark(dom, ancestor))
            }
            LocateStrategy::LinkParent => {
                let link = self.conversation_links(dom, None).into_iter().next()?;
                dom.parent(&link.node)
            }
        }
    }

    /// Conversation links under `scope`, skipping anything inside the panel.
    pub fn conversation_links<D: HostDom<Node = N>>(
        &self,
        dom: &D,
        scope: Option<&N>,
    ) -> Vec<ConversationLink<N>> {
        let links = Query::tag("a").with_attr(AttrFilter::present("href"));
        dom.query(scope, &links)
            .into_iter()
            .filter(|node| !dom.is_inside_panel(node))
            .filter_map(|node| {
                let path = dom.link_path(&node)?;
                let chat = conversation_chat_id(
                    &path,
                    &self.identity.route_prefixes,
                    self.identity.min_chat_id_len,
                )?;
                Some(ConversationLink { node, chat, path })
            })
            .collect()
    }

    /// Titles and paths of the conversations listed in `container`, first
    /// occurrence wins.
    pub fn scrape_chats<D: HostDom<Node = N>>(
        &self,
        dom: &D,
        container: &N,
    ) -> IndexMap<ChatId, ScrapedChat> {
        let mut chats = IndexMap::new();
        for link in self.conversation_links(dom, Some(container)) {
            chats.entry(link.chat).or_insert_with(|| ScrapedChat {
                title: dom.text(&link.node).trim().to_string(),
                path: link.path,
            });
        }
        chats
    }

    /// The host's "start new conversation" control inside `container`.
    pub fn new_chat_anchor<D: HostDom<Node = N>>(&self, dom: &D, container: &N) -> Option<N> {
        let candidates = [
            Query::tag("a"),
            Query::tag("button"),
            Query::any().with_attr(AttrFilter::equals("role", "button")),
        ];
        candidates.iter().find_map(|query| {
            dom.query(Some(container), query)
                .into_iter()
                .find(|node| !dom.is_inside_panel(node) && self.is_new_chat_control(dom, node))
        })
    }

    fn is_new_chat_control<D: HostDom<Node = N>>(&self, dom: &D, node: &N) -> bool {
        if let Some(path) = dom.link_path(node) {
            if self.locator.new_chat_paths.iter().any(|expected| *expected == path) {
                return true;
            }
        }
        let text = dom.text(node);
        let text = text.trim();
        !text.is_empty()
            && self
                .locator
                .new_chat_labels
                .iter()
                .any(|label| label.eq_ignore_ascii_case(text))
    }

    fn has_conversation_link<D: HostDom<Node = N>>(&self, dom: &D, container: &N) -> bool {
        !self.conversation_links(dom, Some(container)).is_empty()
    }

    fn is_landmark<D: HostDom<Node = N>>(&self, dom: &D, node: &N) -> bool {
        let tag = dom.tag_name(node);
        if self.locator.landmark_tags.iter().any(|expected| *expected == tag) {
            return true;
        }
        if let Some(role) = dom.attribute(node, "role") {
            if self.locator.landmark_roles.iter().any(|expected| *expected == role) {
                return true;
            }
        }
        dom.is_scroll_container(node)
    }
}
