use super::*;

impl Document {
    /// The starter CV a new session opens with.
    pub fn sample(ids: &mut dyn IdGenerator) -> Self {
        let detail = |ids: &mut dyn IdGenerator, label: &str, value: &str| PersonalInfoItem {
            id: ids.next_id(),
            label: label.to_string(),
            value: value.to_string(),
        };
        let details = vec![
            detail(ids, "Email:", "jane.doe@example.com"),
            detail(ids, "Phone:", "+1 (555) 123-4567"),
            detail(ids, "Website:", "janedoe.dev"),
            detail(ids, "LinkedIn:", "linkedin.com/in/janedoe"),
            detail(ids, "Location:", "San Francisco, CA"),
        ];

        let work = vec![
            Entry::new(
                ids.next_id(),
                EntryBody::WorkExperience(WorkExperienceEntry {
                    job_title: "Senior Frontend Engineer".into(),
                    job_title_extra: "Contractor".into(),
                    company: "Tech Innovations Inc.".into(),
                    company_link: "techinnovations.example.com".into(),
                    location: "San Francisco, CA".into(),
                    start_date: "2021-01-01".into(),
                    end_date: PRESENT.into(),
                    description: "<ul><li>Led the development of a new user-facing dashboard using React, TypeScript, and Tailwind CSS, improving user engagement by 25%.</li><li>Mentored junior developers and conducted code reviews to maintain high code quality.</li><li>Collaborated with UX/UI designers to translate mockups into responsive, high-performance web applications.</li></ul>".into(),
                    ..Default::default()
                }),
            ),
            Entry::new(
                ids.next_id(),
                EntryBody::WorkExperience(WorkExperienceEntry {
                    job_title: "Frontend Developer".into(),
                    company: "Web Solutions Co.".into(),
                    location: "Austin, TX".into(),
                    start_date: "2018-06-01".into(),
                    end_date: "2020-12-31".into(),
                    description: "<ul><li>Developed and maintained client websites using JavaScript, HTML5, and CSS3.</li><li>Optimized web applications for maximum speed and scalability.</li><li>Worked in an Agile environment to deliver features on a regular basis.</li></ul>".into(),
                    ..Default::default()
                }),
            ),
        ];

        let education = vec![Entry::new(
            ids.next_id(),
            EntryBody::Education(EducationEntry {
                degree: "B.S. in Computer Science".into(),
                degree_extra: "With Honors".into(),
                institution: "University of Technology".into(),
                institution_link: "u-of-tech.edu".into(),
                location: "Cambridge, MA".into(),
                start_date: "2014-09-01".into(),
                end_date: "2018-05-31".into(),
                description: "Member of the Coding Club.".into(),
                ..Default::default()
            }),
        )];

        let skill = |ids: &mut dyn IdGenerator, name: &str, level: &str, category: &str, description: &str| {
            Entry::new(
                ids.next_id(),
                EntryBody::Skill(SkillEntry {
                    skill_name: name.into(),
                    level: level.into(),
                    category: category.into(),
                    description: description.into(),
                }),
            )
        };
        let skills = vec![
            skill(ids, "React", "Expert", "Frameworks & Libraries", "Deep experience with Hooks, Context API, and performance optimization techniques."),
            skill(ids, "TypeScript", "Expert", "Languages", ""),
            skill(ids, "JavaScript (ES6+)", "Expert", "Languages", ""),
            skill(ids, "Tailwind CSS", "Advanced", "Frameworks & Libraries", "Utilized in multiple projects for rapid, responsive UI development."),
            skill(ids, "Node.js", "Intermediate", "", ""),
            skill(ids, "UI/UX Design", "Advanced", "Design", ""),
        ];

        let project = |ids: &mut dyn IdGenerator, name: &str, link: &str, description: &str| {
            Entry::new(
                ids.next_id(),
                EntryBody::Project(ProjectEntry {
                    project_name: name.into(),
                    link: link.into(),
                    description: description.into(),
                    ..Default::default()
                }),
            )
        };
        let projects = vec![
            project(ids, "Personal Portfolio Website", "janedoe.dev", "A responsive portfolio built with Next.js and deployed on Vercel."),
            project(ids, "Task Management App", "github.com/jane/task-app", "A full-stack MERN application for managing daily tasks."),
        ];

        let section = |ids: &mut dyn IdGenerator,
                       title: &str,
                       section_type: SectionType,
                       layout: SectionLayout,
                       visible: bool,
                       items: Vec<Entry>| Section {
            id: ids.next_id(),
            title: title.into(),
            section_type,
            items,
            layout: Some(layout),
            display_style: None,
            visible,
            page_break_before: false,
            page_break_after: false,
        };

        let mut languages = section(ids, "Languages", SectionType::Languages, SectionLayout::Compact, false, vec![]);
        languages.display_style = Some(DisplayStyle::Inline);

        Document {
            personal_info: PersonalInfo {
                name: "Jane Doe".into(),
                job_title: "Senior Frontend Engineer".into(),
                details,
            },
            sections: vec![
                section(ids, "Work Experience", SectionType::WorkExperience, SectionLayout::Bullets, true, work),
                section(ids, "Education", SectionType::Education, SectionLayout::List, true, education),
                section(ids, "Skills", SectionType::Skills, SectionLayout::Chips, true, skills),
                section(ids, "Projects", SectionType::Projects, SectionLayout::Bullets, true, projects),
                section(ids, "Certifications", SectionType::Certifications, SectionLayout::List, false, vec![]),
                languages,
            ],
        }
    }
}
