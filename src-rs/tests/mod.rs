#[cfg(test)]
pub mod support;



#[cfg(test)]
pub mod cons {
    pub mod provider_cons;
}

#[cfg(test)]
pub mod workspace {
    pub mod exclusion;
    pub mod ignore_cache;
    pub mod scanner;
    pub mod tree_format;
}

#[cfg(test)]
pub mod llm {
    pub mod models {
        pub mod openai;
        pub mod provider_handle;
    }
    pub mod prompts {
        pub mod file_selection;
    }
    pub mod utils {
        pub mod file_list;
    }
}

#[cfg(test)]
pub mod selection {
    pub mod bulk;
    pub mod host;
    pub mod pipeline;
    pub mod setup;
}
