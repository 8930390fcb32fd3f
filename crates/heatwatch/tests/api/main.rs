mod dashboard_api;
mod helpers;
mod storage;
mod ui_fragments;
