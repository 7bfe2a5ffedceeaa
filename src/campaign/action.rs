//! Campaign browse screen actions.

use crate::encounter::EncounterDetailAction;
use crate::navigation::Destination;
use crate::runtime::ResourceAction;
use crate::storage::StorageError;

use super::node::CampaignNode;
use super::state::{NextScreen, NodeEditState, Sheet};

#[derive(Debug, Clone, PartialEq)]
pub enum CampaignBrowseAction {
    Items(ResourceAction<Vec<CampaignNode>, StorageError>),
    /// Edit sheet confirmed: (working copy, node being edited or
    /// `None` when creating, final title).
    DidTapNodeEditDone(NodeEditState, Option<CampaignNode>, String),
    DidTapConfirmMoveButton,
    Remove(CampaignNode),
    Sheet(Option<Sheet>),
    /// Cross-cutting: executed by the screen that presented the move
    /// sheet, re-emitted unchanged by every screen in between.
    PerformMove(Vec<CampaignNode>, CampaignNode),
    MoveSheet(Box<CampaignBrowseAction>),
    SetNextScreen(Option<NextScreen>),
    NextScreen(Box<NextScreenAction>),
    SetDetailScreen(Option<NextScreen>),
    DetailScreen(Box<NextScreenAction>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextScreenAction {
    CampaignBrowse(CampaignBrowseAction),
    EncounterDetail(EncounterDetailAction),
}

impl CampaignBrowseAction {
    /// Present (or dismiss, with `None`) a screen at `destination`.
    pub fn present_screen(destination: Destination, screen: Option<NextScreen>) -> Self {
        match destination {
            Destination::NextInStack => CampaignBrowseAction::SetNextScreen(screen),
            Destination::Detail => CampaignBrowseAction::SetDetailScreen(screen),
        }
    }

    /// Route an action to the screen presented at `destination`.
    pub fn presented_screen(destination: Destination, action: NextScreenAction) -> Self {
        match destination {
            Destination::NextInStack => CampaignBrowseAction::NextScreen(Box::new(action)),
            Destination::Detail => CampaignBrowseAction::DetailScreen(Box::new(action)),
        }
    }

    pub fn items(&self) -> Option<ResourceAction<Vec<CampaignNode>, StorageError>> {
        match self {
            CampaignBrowseAction::Items(action) => Some(action.clone()),
            _ => None,
        }
    }

    pub fn next_campaign_browse(&self) -> Option<CampaignBrowseAction> {
        match self {
            CampaignBrowseAction::NextScreen(next) => match &**next {
                NextScreenAction::CampaignBrowse(action) => Some(action.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn next_encounter_detail(&self) -> Option<EncounterDetailAction> {
        match self {
            CampaignBrowseAction::NextScreen(next) => match &**next {
                NextScreenAction::EncounterDetail(action) => Some(action.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn detail_encounter_detail(&self) -> Option<EncounterDetailAction> {
        match self {
            CampaignBrowseAction::DetailScreen(next) => match &**next {
                NextScreenAction::EncounterDetail(action) => Some(action.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn move_sheet(&self) -> Option<CampaignBrowseAction> {
        match self {
            CampaignBrowseAction::MoveSheet(action) => Some((**action).clone()),
            _ => None,
        }
    }
}
