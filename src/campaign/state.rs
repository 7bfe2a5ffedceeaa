//! Campaign browse screen state.

use uuid::Uuid;

use crate::encounter::EncounterDetailState;
use crate::navigation::{
    normalized_screens, DedupEquatable, Destination, Presentable, PresentedScreens, StackItem,
};
use crate::runtime::AsyncResource;
use crate::storage::StorageError;

use super::node::{CampaignNode, ContentType};

/// State of one campaign browse screen.
///
/// The screen is recursive: its next-in-stack screen can be another
/// browse screen, and its move sheet is a browse screen in move mode.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignBrowseState {
    pub node: CampaignNode,
    pub mode: Mode,
    pub items: AsyncResource<Vec<CampaignNode>, StorageError>,
    pub sheet: Option<Sheet>,
    pub presented_screens: PresentedScreens<NextScreen>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    /// Picking a destination for the nodes being moved.
    Move(Vec<CampaignNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sheet {
    NodeEdit(NodeEditState),
    Move(Box<CampaignBrowseState>),
}

/// Working copy for the create/rename sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEditState {
    pub id: Uuid,
    pub name: String,
    /// Set when creating a non-folder node.
    pub content_type: Option<ContentType>,
    /// `None` when creating a new node.
    pub node: Option<CampaignNode>,
}

/// Screen pushed from a browse screen.
#[derive(Debug, Clone, PartialEq)]
pub enum NextScreen {
    CampaignBrowse(Box<CampaignBrowseState>),
    EncounterDetail(Box<EncounterDetailState>),
}

impl CampaignBrowseState {
    pub fn new(node: CampaignNode, mode: Mode) -> Self {
        Self {
            node,
            mode,
            items: AsyncResource::initial(),
            sheet: None,
            presented_screens: PresentedScreens::new(),
        }
    }

    /// Browse screen rooted at the campaign root.
    pub fn root() -> Self {
        Self::new(CampaignNode::root(), Mode::Browse)
    }

    pub fn null_instance() -> Self {
        Self::root()
    }

    pub fn is_move_mode(&self) -> bool {
        matches!(self.mode, Mode::Move(_))
    }

    pub fn is_being_moved(&self, node: &CampaignNode) -> bool {
        match &self.mode {
            Mode::Move(nodes) => nodes.iter().any(|n| n.id == node.id),
            Mode::Browse => false,
        }
    }

    /// Loaded children in display order; move mode shows folders only.
    pub fn sorted_items(&self) -> Option<Vec<&CampaignNode>> {
        let items = self.items.value()?;
        let mut visible: Vec<&CampaignNode> = if self.is_move_mode() {
            items.iter().filter(|n| n.is_folder()).collect()
        } else {
            items.iter().collect()
        };
        visible.sort_by(|a, b| a.title.cmp(&b.title));
        Some(visible)
    }

    pub fn next_campaign_browse(&mut self) -> Option<&mut CampaignBrowseState> {
        match self.presented_screens.get_mut(&Destination::NextInStack) {
            Some(NextScreen::CampaignBrowse(state)) => Some(state),
            _ => None,
        }
    }

    pub fn next_encounter_detail(&mut self) -> Option<&mut EncounterDetailState> {
        match self.presented_screens.get_mut(&Destination::NextInStack) {
            Some(NextScreen::EncounterDetail(state)) => Some(state),
            _ => None,
        }
    }

    pub fn detail_encounter_detail(&mut self) -> Option<&mut EncounterDetailState> {
        match self.presented_screens.get_mut(&Destination::Detail) {
            Some(NextScreen::EncounterDetail(state)) => Some(state),
            _ => None,
        }
    }

    pub fn move_sheet_state(&mut self) -> Option<&mut CampaignBrowseState> {
        match &mut self.sheet {
            Some(Sheet::Move(state)) => Some(state),
            _ => None,
        }
    }

    pub fn node_edit_state(&self) -> Option<&NodeEditState> {
        match &self.sheet {
            Some(Sheet::NodeEdit(state)) => Some(state),
            _ => None,
        }
    }
}

impl StackItem for CampaignBrowseState {
    fn stack_id(&self) -> String {
        self.node.id.to_string()
    }

    fn stack_title(&self) -> String {
        self.node.title.clone()
    }
}

impl Presentable for NextScreen {
    fn null_instance(&self) -> Self {
        match self {
            NextScreen::CampaignBrowse(_) => {
                NextScreen::CampaignBrowse(Box::new(CampaignBrowseState::null_instance()))
            }
            NextScreen::EncounterDetail(_) => {
                NextScreen::EncounterDetail(Box::new(EncounterDetailState::null_instance()))
            }
        }
    }
}

impl DedupEquatable for CampaignBrowseState {
    fn normalized_for_dedup(&self) -> Self {
        let mut normalized = self.clone();
        normalized.presented_screens = normalized_screens(&self.presented_screens);
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(parent: &CampaignNode, title: &str) -> CampaignNode {
        CampaignNode {
            id: Uuid::new_v4(),
            title: title.to_string(),
            contents: None,
            special: None,
            parent_key_prefix: Some(parent.key_prefix_for_children()),
        }
    }

    fn browse_with_pushed_child() -> CampaignBrowseState {
        let mut state = CampaignBrowseState::root();
        let child = CampaignBrowseState::new(folder(&state.node, "child"), Mode::Browse);
        state.presented_screens.insert(
            Destination::NextInStack,
            NextScreen::CampaignBrowse(Box::new(child)),
        );
        state
    }

    #[test]
    fn dedup_erases_pushed_screen_contents() {
        let a = browse_with_pushed_child();
        let mut b = a.clone();
        // Mutate deep inside the pushed screen only.
        if let Some(pushed) = b.next_campaign_browse() {
            pushed.mode = Mode::Move(Vec::new());
        }

        assert_ne!(a, b);
        assert!(a.dedup_eq(&b));
    }

    #[test]
    fn dedup_still_sees_current_level_changes() {
        let a = browse_with_pushed_child();
        let mut b = a.clone();
        b.sheet = Some(Sheet::NodeEdit(NodeEditState {
            id: Uuid::nil(),
            name: "new folder".into(),
            content_type: None,
            node: None,
        }));

        assert!(!a.dedup_eq(&b));
    }

    #[test]
    fn dedup_sees_presence_change_of_pushed_screen() {
        let a = browse_with_pushed_child();
        let mut b = a.clone();
        b.presented_screens.remove(&Destination::NextInStack);

        assert!(!a.dedup_eq(&b));
    }

    #[test]
    fn move_mode_hides_non_folders() {
        let root = CampaignNode::root();
        let mut folder_node = folder(&root, "a folder");
        folder_node.contents = None;
        let mut encounter_node = folder(&root, "an encounter");
        encounter_node.contents = Some(crate::campaign::CampaignNodeContents {
            key: "encounter/x".into(),
            content_type: ContentType::Encounter,
        });

        let mut state = CampaignBrowseState::new(root, Mode::Move(Vec::new()));
        state.items = loaded(vec![folder_node.clone(), encounter_node]);
        let visible = state.sorted_items().expect("loaded");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, folder_node.id);
    }

    fn loaded(nodes: Vec<CampaignNode>) -> AsyncResource<Vec<CampaignNode>, StorageError> {
        use crate::runtime::{Reducer, ResourceAction};
        let mut resource = AsyncResource::initial();
        let reducer: Reducer<_, _, ()> =
            AsyncResource::reducer(|_| Box::pin(async { Ok(Vec::new()) }));
        reducer.reduce(&mut resource, ResourceAction::StartLoading, &());
        reducer.reduce(&mut resource, ResourceAction::ResultReceived(Ok(nodes)), &());
        resource
    }
}
