use near_sdk::AccountId;

use super::builder::EventBuilder;
use super::COLLECTION;

pub fn emit_collection_created(collection_id: u64, created_by: &str) {
    EventBuilder::new(COLLECTION, "collection_created", created_by)
        .field("collection_id", collection_id.to_string())
        .emit();
}

pub fn emit_collection_updated(collection_id: u64) {
    EventBuilder::new(COLLECTION, "collection_updated", collection_id.to_string()).emit();
}

pub fn emit_collection_deleted(collection_id: u64) {
    EventBuilder::new(COLLECTION, "collection_deleted", collection_id.to_string()).emit();
}

pub fn emit_address_list_created(creator: &AccountId, list_id: &str, num_addresses: usize) {
    EventBuilder::new(COLLECTION, "address_list_created", creator)
        .field("list_id", list_id)
        .field("num_addresses", num_addresses as u64)
        .emit();
}

pub fn emit_dynamic_store_created(store_id: u64, created_by: &str) {
    EventBuilder::new(COLLECTION, "dynamic_store_created", created_by)
        .field("store_id", store_id.to_string())
        .emit();
}
