pub(crate) mod supabase;
